//! Irrigation scheduler.
//!
//! Owns every [`PumpChannel`] together with the shared calibration and the
//! latest sensor snapshot.  Once per poll cycle the service calls
//! [`SchedulerState::check_schedule`], which stops finished runs and
//! starts due ones, notifying a [`SchedulerDelegate`] of each transition.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      SchedulerState                          │
//! │                                                              │
//! │  RawSamples ──▶ update_sensors ──▶ SensorSnapshot            │
//! │                                          │                   │
//! │        ┌─────────────────────────────────┘                   │
//! │        ▼                                                     │
//! │  for each channel:                                           │
//! │    Running && run_complete ──▶ stop  ──▶ on_pump_stopped     │
//! │    Idle    && evaluate     ──▶ start ──▶ on_pump_started     │
//! │                                                              │
//! └──────────────────────────────────┬───────────────────────────┘
//!                                    ▼
//!                      SchedulerDelegate (AppService)
//!                      drives ActuatorPort, emits events
//! ```

use log::info;

use crate::app::ports::{SchedulerDelegate, StopReason};
use crate::channel::PumpChannel;
use crate::config::{CalibrationConfig, NUM_CHANNELS};
use crate::sensors::{RawSamples, SensorSnapshot};
use crate::time::Millis;

/// All mutable irrigation state, owned by the service and passed by
/// reference to the scheduler and menu paths.
#[derive(Debug, Clone, Default)]
pub struct SchedulerState {
    pub channels: [PumpChannel; NUM_CHANNELS],
    pub calibration: CalibrationConfig,
    /// Filtered 0-100 readings from the last poll.
    pub snapshot: SensorSnapshot,
    /// Unfiltered samples from the last poll, used for calibration capture.
    pub last_raw: RawSamples,
}

impl SchedulerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a fresh sample set into the snapshot.
    pub fn update_sensors(&mut self, raw: RawSamples) {
        self.snapshot = self.snapshot.next(&raw, &self.calibration);
        self.last_raw = raw;
    }

    /// Stop finished runs and start due ones.
    ///
    /// A channel that finishes this cycle is not re-evaluated until the
    /// next cycle.
    pub fn check_schedule(&mut self, now: Millis, delegate: &mut dyn SchedulerDelegate) {
        for (index, channel) in self.channels.iter_mut().enumerate() {
            if channel.is_running() {
                if channel.run_complete(now) {
                    channel.stop();
                    info!("Scheduler: channel {index} run complete");
                    delegate.on_pump_stopped(index, StopReason::RunComplete);
                }
                continue;
            }

            if channel.evaluate(now, &self.snapshot, index) {
                channel.start(now);
                info!(
                    "Scheduler: channel {index} started ({}s at {}%)",
                    channel.config().run_secs,
                    channel.config().power
                );
                delegate.on_pump_started(index, channel.duty());
            }
        }
    }

    /// Start every channel now, stamping each frequency window.
    pub fn start_all(&mut self, now: Millis, delegate: &mut dyn SchedulerDelegate) {
        for (index, channel) in self.channels.iter_mut().enumerate() {
            channel.stamp_last_run(now);
            channel.start(now);
            delegate.on_pump_started(index, channel.duty());
        }
        info!("Scheduler: all channels started");
    }

    /// Whether any pump is currently running.
    pub fn any_running(&self) -> bool {
        self.channels.iter().any(PumpChannel::is_running)
    }

    /// Per-channel actuator duty.
    pub fn duties(&self) -> [u8; NUM_CHANNELS] {
        core::array::from_fn(|i| self.channels[i].duty())
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
