//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC on the board, stderr in the simulation).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::menu::MenuPage;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => info!("START | controller running"),
            AppEvent::PumpStarted { channel, duty, manual } => {
                info!(
                    "PUMP | ch{} ON duty={}%{}",
                    channel,
                    duty,
                    if *manual { " (manual)" } else { "" }
                );
            }
            AppEvent::PumpStopped { channel, reason } => {
                info!("PUMP | ch{} OFF ({:?})", channel, reason);
            }
            AppEvent::MenuChanged(MenuPage::Home { channel }) => {
                info!("MENU | home ch{}", channel);
            }
            AppEvent::MenuChanged(MenuPage::Settings { channel, page }) => {
                info!("MENU | ch{} {:?}", channel, page);
            }
            AppEvent::FieldChanged { channel, field, value } => {
                info!("MENU | ch{} {:?}={}", channel, field, value);
            }
            AppEvent::Calibrated { point, raw } => {
                info!("CONFIG | calibrated {:?} raw={}", point, raw);
            }
            AppEvent::ConfigSaved => info!("CONFIG | saved"),
            AppEvent::ConfigSaveFailed => warn!("CONFIG | save failed"),
            AppEvent::ConfigReverted => info!("CONFIG | reverted to stored"),
            AppEvent::Sleeping => info!("POWER | low-power polling"),
            AppEvent::Woke => info!("POWER | awake"),
            AppEvent::Telemetry(t) => match serde_json::to_string(t) {
                Ok(json) => info!("TELEM | {}", json),
                Err(e) => warn!("TELEM | encode failed: {}", e),
            },
        }
    }
}
