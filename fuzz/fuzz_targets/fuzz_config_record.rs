//! Fuzz target: configuration record decoding
//!
//! Loads arbitrary EEPROM contents through `record::decode` and asserts
//! that every repaired field lands inside its limits on a step boundary,
//! and that a decoded config survives a save/load cycle unchanged.
//!
//! cargo fuzz run fuzz_config_record

#![no_main]

use libfuzzer_sys::fuzz_target;
use plantwater::config::{
    FieldLimits, CALIBRATION_MAX, FREQUENCY, LIGHT_THRESHOLD, POWER, RUN_SECS, SOIL_THRESHOLD,
};
use plantwater::store::{record, RECORD_LEN};

fn check(value: i32, limits: FieldLimits, name: &str) {
    assert!(limits.contains(value), "{name} = {value} escaped its limits");
    assert_eq!(value % limits.step, 0, "{name} = {value} is off its step");
}

fuzz_target!(|data: &[u8]| {
    // Short inputs model a partially programmed part: the tail stays erased.
    let mut buf = [0xFF; RECORD_LEN];
    let n = data.len().min(RECORD_LEN);
    buf[..n].copy_from_slice(&data[..n]);

    let (channels, cal) = record::decode(&buf);
    for c in &channels {
        check(c.frequency_minutes as i32, FREQUENCY, "frequency");
        check(c.run_secs as i32, RUN_SECS, "run_secs");
        check(c.power as i32, POWER, "power");
        check(c.soil_threshold as i32, SOIL_THRESHOLD, "soil_threshold");
        check(c.light_threshold as i32, LIGHT_THRESHOLD, "light_threshold");
    }
    let max = CALIBRATION_MAX as u16;
    assert!(cal.light_day_raw <= max && cal.light_night_raw <= max);
    assert!(cal.soil_dry_raw.iter().chain(&cal.soil_wet_raw).all(|&r| r <= max));

    let (again, again_cal) = record::decode(&record::encode(&channels, &cal));
    assert_eq!(again, channels);
    assert_eq!(again_cal, cal);
});
