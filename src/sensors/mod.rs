//! Sensor acquisition and conditioning.
//!
//! ```text
//!   ADC raw (0-1023) ──▶ normalize (calibration) ──▶ filter (EMA) ──▶ SensorSnapshot
//! ```
//!
//! [`SensorHub`] samples the light sensor and one soil-moisture probe per
//! channel.  [`SensorSnapshot::next`] turns those raw samples into the
//! 0-100 readings the scheduler gates on.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 via the oneshot API (initialised by hw_init).
//! On host/test: reads from static atomics for injection.

pub mod filter;

use core::sync::atomic::{AtomicU16, Ordering};

use crate::config::{CalibrationConfig, NUM_CHANNELS};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

static SIM_LIGHT_ADC: AtomicU16 = AtomicU16::new(0);
static SIM_SOIL_ADC: [AtomicU16; NUM_CHANNELS] = [const { AtomicU16::new(0) }; NUM_CHANNELS];

/// Inject a raw light reading for the simulation backend.
pub fn sim_set_light_adc(raw: u16) {
    SIM_LIGHT_ADC.store(raw, Ordering::Relaxed);
}

/// Inject a raw soil reading for `channel` in the simulation backend.
pub fn sim_set_soil_adc(channel: usize, raw: u16) {
    if let Some(slot) = SIM_SOIL_ADC.get(channel) {
        slot.store(raw, Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// Raw samples
// ---------------------------------------------------------------------------

/// One poll cycle's raw ADC readings, 10-bit domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawSamples {
    pub light: u16,
    pub soil: [u16; NUM_CHANNELS],
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Normalized, filtered readings shared by every channel for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SensorSnapshot {
    /// Ambient light, 0 (night endpoint) to 100 (day endpoint).
    pub light: u8,
    /// Soil moisture per channel, 0 (dry endpoint) to 100 (wet endpoint).
    pub soil_moisture: [u8; NUM_CHANNELS],
}

impl SensorSnapshot {
    /// Build the next snapshot from `raw`, smoothing against `self`.
    pub fn next(&self, raw: &RawSamples, cal: &CalibrationConfig) -> Self {
        let light = normalize(raw.light, cal.light_night_raw, cal.light_day_raw);
        let mut soil_moisture = [0u8; NUM_CHANNELS];
        for (ch, slot) in soil_moisture.iter_mut().enumerate() {
            let reading = normalize(raw.soil[ch], cal.soil_dry_raw[ch], cal.soil_wet_raw[ch]);
            *slot = filter::filter(self.soil_moisture[ch], reading);
        }
        Self {
            light: filter::filter(self.light, light),
            soil_moisture,
        }
    }
}

/// Map `raw` linearly from `[from, to]` onto `[0, 100]` and clamp.
///
/// Integer math truncates toward zero.  `from > to` is allowed (inverted
/// sensors).  Equal endpoints carry no information and read as 0.
pub fn normalize(raw: u16, from: u16, to: u16) -> u8 {
    let span = to as i32 - from as i32;
    if span == 0 {
        return 0;
    }
    let mapped = (raw as i32 - from as i32) * 100 / span;
    mapped.clamp(0, 100) as u8
}

// ---------------------------------------------------------------------------
// SensorHub
// ---------------------------------------------------------------------------

/// Samples every analog sensor on the board.
pub struct SensorHub {
    total_reads: u32,
}

impl Default for SensorHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorHub {
    pub fn new() -> Self {
        Self { total_reads: 0 }
    }

    /// Read the light sensor and all soil probes.
    pub fn read_raw(&mut self) -> RawSamples {
        self.total_reads = self.total_reads.wrapping_add(1);
        let mut soil = [0u16; NUM_CHANNELS];
        for (ch, slot) in soil.iter_mut().enumerate() {
            *slot = Self::read_soil_adc(ch);
        }
        RawSamples {
            light: Self::read_light_adc(),
            soil,
        }
    }

    /// Number of sampling passes since boot.
    pub fn total_reads(&self) -> u32 {
        self.total_reads
    }

    #[cfg(target_os = "espidf")]
    fn read_light_adc() -> u16 {
        hw_init::adc1_read_10bit(hw_init::ADC1_CH_LIGHT)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_light_adc() -> u16 {
        SIM_LIGHT_ADC.load(Ordering::Relaxed)
    }

    #[cfg(target_os = "espidf")]
    fn read_soil_adc(channel: usize) -> u16 {
        hw_init::adc1_read_10bit(hw_init::ADC1_CH_SOIL[channel])
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_soil_adc(channel: usize) -> u16 {
        SIM_SOIL_ADC[channel].load(Ordering::Relaxed)
    }
}
