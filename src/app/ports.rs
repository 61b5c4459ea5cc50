//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, pumps, EEPROM, event sinks, wake-up source)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use crate::app::commands::OperatorEvent;
use crate::error::{ActuatorError, StorageError};
use crate::sensors::RawSamples;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per poll cycle.
pub trait SensorPort {
    /// Sample the light sensor and every soil probe (10-bit raw).
    fn read_raw(&mut self) -> RawSamples;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to drive the pumps.
pub trait ActuatorPort {
    /// Set the duty (0–100) of one pump.  0 stops it.
    fn set_pump_duty(&mut self, channel: usize, duty: u8) -> Result<(), ActuatorError>;

    /// Stop every pump.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// EEPROM port (driven adapter: domain ↔ persistent block)
// ───────────────────────────────────────────────────────────────

/// Byte-addressed persistent storage holding the configuration record.
///
/// A read that follows an update must observe the updated bytes.
pub trait EepromPort {
    /// Fill `buf` from `addr`.  Never-written cells read as `0xFF`.
    fn read_block(&mut self, addr: u16, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Write `data` at `addr`, touching only cells whose value changes.
    fn update_block(&mut self, addr: u16, data: &[u8]) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Wake source (driven adapter: ISR / stdin → control loop)
// ───────────────────────────────────────────────────────────────

/// Why [`WakeSource::wait`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// An operator button press arrived.
    Operator(OperatorEvent),
    /// The poll interval elapsed without input.
    Timeout,
}

/// Blocking wait between poll cycles that an operator event cancels.
pub trait WakeSource {
    fn wait(&mut self, timeout_ms: u32) -> Wake;
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from actuators/events)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the scheduler invokes on pump transitions.
///
/// The [`AppService`](super::service::AppService) implements this by
/// emitting events; the scheduler itself knows nothing about hardware.
pub trait SchedulerDelegate {
    /// A channel started a run at `duty`.
    fn on_pump_started(&mut self, channel: usize, duty: u8);

    /// A channel's run ended.
    fn on_pump_stopped(&mut self, channel: usize, reason: StopReason);
}

/// Discriminant passed to [`SchedulerDelegate::on_pump_stopped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum StopReason {
    /// The configured run duration elapsed.
    RunComplete,
    /// The operator stopped a run from the home page.
    Manual,
}
