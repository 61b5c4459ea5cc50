//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use serde::Serialize;

use super::menu::{CalibrationPoint, MenuPage};
use super::ports::StopReason;
use crate::channel::Field;
use crate::config::NUM_CHANNELS;
use crate::sensors::SensorSnapshot;
use crate::time::Millis;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service has loaded its configuration and is running.
    Started,

    /// A pump began running.  `manual` runs leave the frequency window alone.
    PumpStarted { channel: usize, duty: u8, manual: bool },

    /// A pump stopped.
    PumpStopped { channel: usize, reason: StopReason },

    /// The operator moved to another menu page.
    MenuChanged(MenuPage),

    /// A tunable field was stepped.
    FieldChanged { channel: usize, field: Field, value: i32 },

    /// A calibration endpoint was captured from a live raw reading.
    Calibrated { point: CalibrationPoint, raw: u16 },

    /// Configuration was written to EEPROM.
    ConfigSaved,

    /// Persisting the configuration failed; in-memory values stay live.
    ConfigSaveFailed,

    /// Unsaved edits were discarded by reloading from EEPROM.
    ConfigReverted,

    /// Entered low-power polling.
    Sleeping,

    /// Left low-power polling on operator input.
    Woke,

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryData {
    pub uptime_ms: Millis,
    pub sensors: SensorSnapshot,
    pub pump_duty: [u8; NUM_CHANNELS],
    pub seconds_to_next_run: [u16; NUM_CHANNELS],
    pub sleeping: bool,
}
