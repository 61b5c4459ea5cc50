//! Per-channel irrigation state machine.
//!
//! ```text
//!            start(now)
//!   ┌──────┐ ─────────▶ ┌─────────────────────────┐
//!   │ Idle │            │ Running { started_at }  │
//!   └──────┘ ◀───────── └─────────────────────────┘
//!               stop()
//! ```
//!
//! A [`PumpChannel`] only records state.  It never stops itself: the
//! scheduler polls [`PumpChannel::run_complete`] every cycle and calls
//! [`PumpChannel::stop`].  Likewise `start` never stamps `last_run_at`;
//! scheduled starts stamp it through [`PumpChannel::evaluate`], manual
//! starts leave the frequency timer alone.

use log::debug;

use crate::config::{
    ChannelConfig, FieldLimits, FREQUENCY, LIGHT_THRESHOLD, POWER, RUN_SECS, SOIL_THRESHOLD,
};
use crate::sensors::SensorSnapshot;
use crate::time::{self, Millis};
use crate::validation::clamp;

/// Run/idle status of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Idle,
    Running { started_at: Millis },
}

/// An operator-tunable field of [`ChannelConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Field {
    Frequency,
    RunSeconds,
    Power,
    SoilThreshold,
    LightThreshold,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Frequency,
        Field::RunSeconds,
        Field::Power,
        Field::SoilThreshold,
        Field::LightThreshold,
    ];

    pub const fn limits(self) -> FieldLimits {
        match self {
            Field::Frequency => FREQUENCY,
            Field::RunSeconds => RUN_SECS,
            Field::Power => POWER,
            Field::SoilThreshold => SOIL_THRESHOLD,
            Field::LightThreshold => LIGHT_THRESHOLD,
        }
    }

    /// Current value of this field in `config`.
    pub const fn get(self, config: &ChannelConfig) -> i32 {
        match self {
            Field::Frequency => config.frequency_minutes as i32,
            Field::RunSeconds => config.run_secs as i32,
            Field::Power => config.power as i32,
            Field::SoilThreshold => config.soil_threshold as i32,
            Field::LightThreshold => config.light_threshold as i32,
        }
    }

    /// Store `value` into `config`.  Callers pass values already within
    /// this field's limits.
    fn set(self, config: &mut ChannelConfig, value: i32) {
        match self {
            Field::Frequency => config.frequency_minutes = value as u16,
            Field::RunSeconds => config.run_secs = value as u16,
            Field::Power => config.power = value as u8,
            Field::SoilThreshold => config.soil_threshold = value as u8,
            Field::LightThreshold => config.light_threshold = value as u8,
        }
    }
}

/// One pump with its tunable configuration and timing state.
#[derive(Debug, Clone)]
pub struct PumpChannel {
    config: ChannelConfig,
    /// When irrigation was last started by the schedule.
    last_run_at: Millis,
    state: ChannelState,
}

impl Default for PumpChannel {
    fn default() -> Self {
        Self::new(ChannelConfig::default())
    }
}

impl PumpChannel {
    pub fn new(config: ChannelConfig) -> Self {
        Self {
            config,
            last_run_at: 0,
            state: ChannelState::Idle,
        }
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Replace the configuration wholesale (boot-time load, revert).
    pub fn set_config(&mut self, config: ChannelConfig) {
        self.config = config;
    }

    pub fn last_run_at(&self) -> Millis {
        self.last_run_at
    }

    /// Make the channel eligible for an immediate due check.
    pub fn reset_last_run(&mut self) {
        self.last_run_at = 0;
    }

    /// Restart the frequency window at `now`.
    pub fn stamp_last_run(&mut self, now: Millis) {
        self.last_run_at = now;
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, ChannelState::Running { .. })
    }

    // ── Transitions ───────────────────────────────────────────

    pub fn start(&mut self, now: Millis) {
        self.state = ChannelState::Running { started_at: now };
    }

    pub fn stop(&mut self) {
        self.state = ChannelState::Idle;
    }

    /// Decide whether the channel should start irrigating now.
    ///
    /// When the frequency window has elapsed `last_run_at` is stamped with
    /// `now` even if the sensor gates then veto the run.  A running channel
    /// is never due and is left untouched.
    pub fn evaluate(&mut self, now: Millis, snapshot: &SensorSnapshot, index: usize) -> bool {
        if self.is_running() {
            return false;
        }
        if now < self.last_run_at {
            debug!("channel {index}: clock wrapped, resetting last run");
            self.last_run_at = 0;
        }

        let due = time::deadline_reached(now, self.last_run_at, self.config.frequency_ms());
        if !due {
            return false;
        }
        self.last_run_at = now;

        let soil = snapshot.soil_moisture.get(index).copied().unwrap_or(u8::MAX);
        let soil_ok = soil <= self.config.soil_threshold;
        let light_ok = snapshot.light >= self.config.light_threshold;
        if !(soil_ok && light_ok) {
            debug!(
                "channel {index}: due but gated (soil {soil} <= {}: {soil_ok}, light {} >= {}: {light_ok})",
                self.config.soil_threshold, snapshot.light, self.config.light_threshold
            );
        }
        soil_ok && light_ok
    }

    /// Seconds until the frequency window closes, for display.
    ///
    /// A clock that has wrapped behind `last_run_at` counts from 0.  Once
    /// the window has passed the result wraps; it is never used for
    /// control decisions.
    pub fn seconds_to_next_run(&self, now: Millis) -> u16 {
        let base = if now < self.last_run_at { 0 } else { self.last_run_at };
        (time::remaining(now, base, self.config.frequency_ms()) / 1000) as u16
    }

    /// Whether the current run has lasted `run_secs`.  False when idle.
    pub fn run_complete(&self, now: Millis) -> bool {
        match self.state {
            ChannelState::Running { started_at } => {
                time::deadline_reached(now, started_at, self.config.run_ms())
            }
            ChannelState::Idle => false,
        }
    }

    /// Seconds of the current run still to go; 0 when idle or overdue.
    pub fn seconds_left(&self, now: Millis) -> u16 {
        match self.state {
            ChannelState::Running { started_at } => {
                let run_ms = self.config.run_ms();
                let done = time::elapsed(now, started_at);
                (run_ms.saturating_sub(done) / 1000) as u16
            }
            ChannelState::Idle => 0,
        }
    }

    /// Actuator duty (0-100): the configured power while running.
    pub fn duty(&self) -> u8 {
        if self.is_running() { self.config.power } else { 0 }
    }

    // ── Operator edits ────────────────────────────────────────

    /// Step `field` up or down by its step size, saturating at the
    /// outermost step-aligned values inside its bounds.
    pub fn adjust(&mut self, field: Field, up: bool) -> i32 {
        let limits = field.limits();
        let current = field.get(&self.config);
        let next = if up { current + limits.step } else { current - limits.step };
        let next = clamp(next, limits.floor(), limits.ceiling());
        field.set(&mut self.config, next);
        next
    }
}
