//! Fixed-layout persisted configuration record.
//!
//! Every field is a little-endian `i16`, channels first, calibration last:
//!
//! ```text
//!  offset  field
//!  ──────  ─────────────────────────────────────────────────────────
//!   10·i   channel i: frequency, run_secs, power, soil, light
//!   30     light_day_raw
//!   32     light_night_raw
//!   34     soil_dry_raw[0..3]
//!   40     soil_wet_raw[0..3]
//!   46     (end)
//! ```
//!
//! Decoding is total.  A blank (`0x00` or `0xFF`) block yields defaults and
//! every field of a written block is repaired against its limits, so a
//! corrupt block still yields a usable config.

use log::debug;

use crate::config::{
    CalibrationConfig, ChannelConfig, FieldLimits, CALIBRATION_MAX, CALIBRATION_MIN,
    FREQUENCY, LIGHT_THRESHOLD, NUM_CHANNELS, POWER, RUN_SECS, SOIL_THRESHOLD,
};
use crate::validation::{clamp, repair};

const FIELD_LEN: usize = 2;
const CHANNEL_FIELDS: usize = 5;
const CHANNEL_LEN: usize = CHANNEL_FIELDS * FIELD_LEN;
const CALIBRATION_LEN: usize = (2 + 2 * NUM_CHANNELS) * FIELD_LEN;

/// Byte length of the whole record.
pub const RECORD_LEN: usize = NUM_CHANNELS * CHANNEL_LEN + CALIBRATION_LEN;

/// Everything the record holds.
pub type Decoded = ([ChannelConfig; NUM_CHANNELS], CalibrationConfig);

/// Sequential little-endian `i16` writer over the record buffer.
struct Writer<'a> {
    buf: &'a mut [u8; RECORD_LEN],
    pos: usize,
}

impl Writer<'_> {
    fn put(&mut self, value: i32) {
        let bytes = (value as i16).to_le_bytes();
        self.buf[self.pos..self.pos + FIELD_LEN].copy_from_slice(&bytes);
        self.pos += FIELD_LEN;
    }
}

/// Sequential little-endian `i16` reader over the record buffer.
struct Reader<'a> {
    buf: &'a [u8; RECORD_LEN],
    pos: usize,
}

impl Reader<'_> {
    fn take(&mut self) -> i32 {
        let value = i16::from_le_bytes([self.buf[self.pos], self.buf[self.pos + 1]]);
        self.pos += FIELD_LEN;
        value as i32
    }

    fn field(&mut self, name: &str, limits: FieldLimits) -> i32 {
        let raw = self.take();
        let fixed = repair(raw, limits);
        if fixed != raw {
            debug!("record: {name} {raw} repaired to {fixed}");
        }
        fixed
    }

    fn calibration(&mut self, name: &str) -> u16 {
        let raw = self.take();
        let fixed = clamp(raw, CALIBRATION_MIN, CALIBRATION_MAX);
        if fixed != raw {
            debug!("record: {name} {raw} clamped to {fixed}");
        }
        fixed as u16
    }
}

/// Serialize channel configs and calibration into the record layout.
pub fn encode(channels: &[ChannelConfig; NUM_CHANNELS], cal: &CalibrationConfig) -> [u8; RECORD_LEN] {
    let mut buf = [0u8; RECORD_LEN];
    let mut w = Writer { buf: &mut buf, pos: 0 };
    for c in channels {
        w.put(c.frequency_minutes as i32);
        w.put(c.run_secs as i32);
        w.put(c.power as i32);
        w.put(c.soil_threshold as i32);
        w.put(c.light_threshold as i32);
    }
    w.put(cal.light_day_raw as i32);
    w.put(cal.light_night_raw as i32);
    for raw in cal.soil_dry_raw {
        w.put(raw as i32);
    }
    for raw in cal.soil_wet_raw {
        w.put(raw as i32);
    }
    buf
}

/// Whether `buf` is an unwritten block (every byte `0x00` or every byte
/// `0xFF`).
pub fn is_blank(buf: &[u8; RECORD_LEN]) -> bool {
    buf.iter().all(|&b| b == 0xFF) || buf.iter().all(|&b| b == 0x00)
}

/// Parse and repair a record.  Never fails.
///
/// A blank block yields factory defaults for every field, calibration
/// included.
pub fn decode(buf: &[u8; RECORD_LEN]) -> Decoded {
    if is_blank(buf) {
        debug!("record: blank block, using factory defaults");
        return ([ChannelConfig::default(); NUM_CHANNELS], CalibrationConfig::default());
    }

    let mut r = Reader { buf, pos: 0 };
    let mut channels = [ChannelConfig::default(); NUM_CHANNELS];
    for c in channels.iter_mut() {
        c.frequency_minutes = r.field("frequency", FREQUENCY) as u16;
        c.run_secs = r.field("run_secs", RUN_SECS) as u16;
        c.power = r.field("power", POWER) as u8;
        c.soil_threshold = r.field("soil_threshold", SOIL_THRESHOLD) as u8;
        c.light_threshold = r.field("light_threshold", LIGHT_THRESHOLD) as u8;
    }

    let mut cal = CalibrationConfig {
        light_day_raw: r.calibration("light_day"),
        light_night_raw: r.calibration("light_night"),
        ..CalibrationConfig::default()
    };
    for raw in cal.soil_dry_raw.iter_mut() {
        *raw = r.calibration("soil_dry");
    }
    for raw in cal.soil_wet_raw.iter_mut() {
        *raw = r.calibration("soil_wet");
    }
    (channels, cal)
}
