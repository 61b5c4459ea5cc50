//! Mock adapters for integration tests.
//!
//! Records every actuator call and emitted event so tests can assert on
//! the full history without touching real ADC/PWM registers or flash.

use plantwater::app::events::AppEvent;
use plantwater::app::ports::{ActuatorPort, EepromPort, EventSink, SensorPort};
use plantwater::config::{CalibrationConfig, ChannelConfig, NUM_CHANNELS};
use plantwater::error::{ActuatorError, StorageError};
use plantwater::sensors::RawSamples;
use plantwater::store::record;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    SetDuty { channel: usize, duty: u8 },
    AllOff,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<ActuatorCall>,
    /// Returned by every `read_raw`.
    pub raw: RawSamples,
    pub fail_pwm: bool,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            raw: RawSamples::default(),
            fail_pwm: false,
        }
    }

    /// Bright light and dry soil on every channel (default calibration).
    pub fn thirsty() -> Self {
        let mut hw = Self::new();
        hw.raw = RawSamples { light: 900, soil: [100; NUM_CHANNELS] };
        hw
    }

    /// Last duty commanded for `channel`, 0 if never driven.
    pub fn duty(&self, channel: usize) -> u8 {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::SetDuty { channel: ch, duty } if *ch == channel => Some(*duty),
                ActuatorCall::AllOff => Some(0),
                _ => None,
            })
            .unwrap_or(0)
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorPort for MockHardware {
    fn set_pump_duty(&mut self, channel: usize, duty: u8) -> Result<(), ActuatorError> {
        if self.fail_pwm {
            return Err(ActuatorError::PwmWriteFailed);
        }
        self.calls.push(ActuatorCall::SetDuty { channel, duty });
        Ok(())
    }

    fn all_off(&mut self) {
        self.calls.push(ActuatorCall::AllOff);
    }
}

impl SensorPort for MockHardware {
    fn read_raw(&mut self) -> RawSamples {
        self.raw
    }
}

// ── MockEeprom ────────────────────────────────────────────────

pub struct MockEeprom {
    pub cells: Vec<u8>,
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub updates: usize,
}

#[allow(dead_code)]
impl MockEeprom {
    /// Factory-fresh part: every cell `0xFF`.
    pub fn blank() -> Self {
        Self::with_cells(vec![0xFF; 64])
    }

    /// A part holding a saved record of default channels and default
    /// calibration.  Blank parts decode calibration endpoints to 0.
    pub fn factory() -> Self {
        let mut cells = record::encode(
            &[ChannelConfig::default(); NUM_CHANNELS],
            &CalibrationConfig::default(),
        )
        .to_vec();
        cells.resize(64, 0xFF);
        Self::with_cells(cells)
    }

    pub fn with_cells(cells: Vec<u8>) -> Self {
        Self { cells, fail_reads: false, fail_writes: false, updates: 0 }
    }
}

impl EepromPort for MockEeprom {
    fn read_block(&mut self, addr: u16, buf: &mut [u8]) -> Result<(), StorageError> {
        if self.fail_reads {
            return Err(StorageError::IoError);
        }
        let start = addr as usize;
        let src = self.cells.get(start..start + buf.len()).ok_or(StorageError::OutOfBounds)?;
        buf.copy_from_slice(src);
        Ok(())
    }

    fn update_block(&mut self, addr: u16, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::IoError);
        }
        let start = addr as usize;
        let dst = self.cells.get_mut(start..start + data.len()).ok_or(StorageError::OutOfBounds)?;
        dst.copy_from_slice(data);
        self.updates += 1;
        Ok(())
    }
}

// ── RecordingSink ────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
