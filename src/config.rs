//! System configuration parameters
//!
//! Two layers live here:
//!
//! - The operator-tunable, persisted settings: one [`ChannelConfig`] per
//!   pump channel plus the shared [`CalibrationConfig`].  These are
//!   loaded and saved by [`ConfigStore`](crate::store::ConfigStore).
//! - The build-time [`ControllerConfig`] (loop timing), which is never
//!   persisted.
//!
//! Every tunable field has a [`FieldLimits`] entry; the limits are the
//! single source of truth for load-time repair and for the operator's
//! increment/decrement steps.

use serde::{Deserialize, Serialize};

/// Number of pump channels (pump + soil sensor pairs) on the board.
pub const NUM_CHANNELS: usize = 3;

/// Inclusive bounds, step size and default of one tunable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLimits {
    pub min: i32,
    pub max: i32,
    pub step: i32,
    pub default: i32,
}

impl FieldLimits {
    /// Whether `value` lies within `[min, max]`.
    pub const fn contains(&self, value: i32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Smallest multiple of `step` that is at least `min`.
    pub const fn floor(&self) -> i32 {
        let r = self.min.rem_euclid(self.step);
        if r == 0 { self.min } else { self.min + self.step - r }
    }

    /// Largest multiple of `step` that is at most `max`.
    pub const fn ceiling(&self) -> i32 {
        self.max - self.max.rem_euclid(self.step)
    }
}

/// Minutes between irrigation starts (every 5 min up to once a day).
pub const FREQUENCY: FieldLimits = FieldLimits { min: 5, max: 1440, step: 5, default: 30 };

/// Seconds the pump runs per activation.
pub const RUN_SECS: FieldLimits = FieldLimits { min: 5, max: 300, step: 5, default: 30 };

/// Pump power, percent of full PWM duty.
pub const POWER: FieldLimits = FieldLimits { min: 1, max: 100, step: 5, default: 80 };

/// Irrigate only when normalized soil moisture is at or below this.
pub const SOIL_THRESHOLD: FieldLimits = FieldLimits { min: 0, max: 100, step: 5, default: 60 };

/// Irrigate only when normalized light is at or above this.
pub const LIGHT_THRESHOLD: FieldLimits = FieldLimits { min: 0, max: 100, step: 5, default: 60 };

/// Raw ADC domain of the soil and light sensors (10-bit).
pub const CALIBRATION_MIN: i32 = 0;
pub const CALIBRATION_MAX: i32 = 1023;

// ---------------------------------------------------------------------------
// Persisted operator configuration
// ---------------------------------------------------------------------------

/// Tunable parameters of a single pump channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Minimum time between irrigation starts, in minutes.
    pub frequency_minutes: u16,
    /// Irrigation duration per activation, in seconds.
    pub run_secs: u16,
    /// Actuator duty while running (1-100 %).
    pub power: u8,
    /// Water only if soil moisture (0-100) is at or below this level.
    pub soil_threshold: u8,
    /// Water only if light (0-100) is at or above this level.
    pub light_threshold: u8,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            frequency_minutes: FREQUENCY.default as u16,
            run_secs: RUN_SECS.default as u16,
            power: POWER.default as u8,
            soil_threshold: SOIL_THRESHOLD.default as u8,
            light_threshold: LIGHT_THRESHOLD.default as u8,
        }
    }
}

impl ChannelConfig {
    /// Frequency expressed in milliseconds.
    pub const fn frequency_ms(&self) -> u32 {
        self.frequency_minutes as u32 * 60 * 1000
    }

    /// Run duration expressed in milliseconds.
    pub const fn run_ms(&self) -> u32 {
        self.run_secs as u32 * 1000
    }
}

/// Raw ADC endpoints used to map sensor readings onto 0-100.
///
/// Light maps `light_night_raw -> 0` and `light_day_raw -> 100`; soil maps
/// `soil_dry_raw[ch] -> 0` and `soil_wet_raw[ch] -> 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    pub light_day_raw: u16,
    pub light_night_raw: u16,
    pub soil_dry_raw: [u16; NUM_CHANNELS],
    pub soil_wet_raw: [u16; NUM_CHANNELS],
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            light_day_raw: CALIBRATION_MAX as u16,
            light_night_raw: CALIBRATION_MIN as u16,
            soil_dry_raw: [CALIBRATION_MIN as u16; NUM_CHANNELS],
            soil_wet_raw: [CALIBRATION_MAX as u16; NUM_CHANNELS],
        }
    }
}

// ---------------------------------------------------------------------------
// Build-time controller configuration
// ---------------------------------------------------------------------------

/// Control-loop timing.  Not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Wait between poll cycles while the operator is active or a pump runs.
    pub poll_interval_ms: u32,
    /// Wait between poll cycles in low-power mode.
    pub sleep_poll_interval_ms: u32,
    /// Enter low-power mode after this long without operator input.
    pub idle_sleep_after_ms: u32,
    /// Telemetry report interval.
    pub telemetry_interval_ms: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 200,
            sleep_poll_interval_ms: 1000,
            idle_sleep_after_ms: 15_000,
            telemetry_interval_ms: 60_000,
        }
    }
}
