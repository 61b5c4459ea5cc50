//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and one [`PumpDriver`] per channel, exposing
//! them through [`SensorPort`] and [`ActuatorPort`].  This is the only
//! module in the system that touches actual hardware.  On non-espidf
//! targets, the underlying drivers use cfg-gated simulation stubs.

use log::warn;

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::config::NUM_CHANNELS;
use crate::drivers::hw_init;
use crate::drivers::pump::{LedcPwm, PumpDriver};
use crate::error::ActuatorError;
use crate::sensors::{RawSamples, SensorHub};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    sensor_hub: SensorHub,
    pumps: [PumpDriver<LedcPwm>; NUM_CHANNELS],
}

impl Default for HardwareAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareAdapter {
    /// Wire every pump to its LEDC channel.
    pub fn new() -> Self {
        Self {
            sensor_hub: SensorHub::new(),
            pumps: core::array::from_fn(|ch| PumpDriver::new(LedcPwm::new(hw_init::LEDC_CH_PUMP[ch]))),
        }
    }

    /// Duty currently applied to each pump (0-100).
    pub fn pump_duties(&self) -> [u8; NUM_CHANNELS] {
        core::array::from_fn(|ch| self.pumps[ch].current_duty())
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_raw(&mut self) -> RawSamples {
        self.sensor_hub.read_raw()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn set_pump_duty(&mut self, channel: usize, duty: u8) -> Result<(), ActuatorError> {
        let pump = self.pumps.get_mut(channel).ok_or(ActuatorError::NoSuchChannel)?;
        pump.set(duty)
    }

    fn all_off(&mut self) {
        for (ch, pump) in self.pumps.iter_mut().enumerate() {
            if let Err(e) = pump.stop() {
                warn!("HardwareAdapter: pump {ch} stop failed: {e}");
            }
        }
    }
}
