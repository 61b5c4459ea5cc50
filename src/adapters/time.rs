//! Monotonic millisecond clock.
//!
//! Provides the wrapping `u32` millisecond counter the control loop runs
//! on.
//!
//! - **`target_os = "espidf"`**: wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic).
//! - **`not(target_os = "espidf")`**: uses `std::time::Instant` for
//!   host-side testing and simulation.

use crate::time::Millis;

/// Boot-relative millisecond clock, truncated to 32 bits.
pub struct MillisClock {
    /// Added to every reading; lets the simulation start near a wrap.
    offset_ms: u32,
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for MillisClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MillisClock {
    pub fn new() -> Self {
        Self::with_offset(0)
    }

    pub fn with_offset(offset_ms: u32) -> Self {
        Self {
            offset_ms,
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot, wrapping at 2^32.
    pub fn now_ms(&self) -> Millis {
        ((self.uptime_us() / 1_000) as u32).wrapping_add(self.offset_ms)
    }

    /// Microseconds since boot (monotonic, wraps at `u64::MAX`).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        // SAFETY: esp_timer_get_time reads a free-running hardware counter.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since boot (monotonic, wraps at `u64::MAX`).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}
