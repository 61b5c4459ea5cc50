//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the device if the control loop stops calling [`Watchdog::feed`]
//! for longer than the configured timeout.  The loop feeds once per poll
//! cycle, so the timeout must exceed the low-power poll interval.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::info;

/// Default reset timeout: several sleep-poll cycles of headroom.
pub const DEFAULT_TIMEOUT_MS: u32 = 5_000;

pub struct Watchdog {
    timeout_ms: u32,
    #[cfg(target_os = "espidf")]
    subscribed: bool,
    feeds: u64,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_MS)
    }
}

impl Watchdog {
    /// Configure the TWDT and subscribe the calling task.
    #[cfg(target_os = "espidf")]
    pub fn new(timeout_ms: u32) -> Self {
        // SAFETY: called once from the main task before the control loop.
        let subscribed = unsafe {
            let cfg = esp_task_wdt_config_t {
                timeout_ms,
                idle_core_mask: 0,
                trigger_panic: true,
            };
            let ret = esp_task_wdt_reconfigure(&cfg);
            if ret != ESP_OK as i32 {
                log::warn!("TWDT reconfigure returned {} (may already be configured)", ret);
            }
            esp_task_wdt_add(core::ptr::null_mut()) == ESP_OK as i32
        };
        if subscribed {
            info!("Watchdog: subscribed ({timeout_ms} ms timeout, panic on trigger)");
        } else {
            log::warn!("Watchdog: failed to subscribe");
        }
        Self { timeout_ms, subscribed, feeds: 0 }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(timeout_ms: u32) -> Self {
        info!("Watchdog(sim): {timeout_ms} ms, no-op");
        Self { timeout_ms, feeds: 0 }
    }

    /// Feed the watchdog.  Call once per poll cycle.
    pub fn feed(&mut self) {
        self.feeds = self.feeds.wrapping_add(1);
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: resets the calling task's TWDT entry; no shared state.
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Number of feeds since construction.
    pub fn feeds(&self) -> u64 {
        self.feeds
    }
}
