//! ConfigStore against a mock EEPROM: blank parts, corrupt records,
//! failing devices and the save side effects.

use super::mock_hw::MockEeprom;

use plantwater::channel::{Field, PumpChannel};
use plantwater::config::{CalibrationConfig, ChannelConfig, NUM_CHANNELS};
use plantwater::error::StorageError;
use plantwater::store::{record, ConfigStore, RECORD_LEN};

fn channels() -> [PumpChannel; NUM_CHANNELS] {
    Default::default()
}

#[test]
fn blank_part_loads_factory_defaults() {
    let mut store = ConfigStore::new(MockEeprom::blank());
    let (configs, cal) = store.load();
    assert_eq!(configs, [ChannelConfig::default(); NUM_CHANNELS]);
    assert_eq!(cal, CalibrationConfig::default());
}

#[test]
fn saved_config_survives_a_reboot() {
    let mut store = ConfigStore::new(MockEeprom::blank());
    let mut live = channels();
    live[1].adjust(Field::Frequency, true);
    live[1].adjust(Field::LightThreshold, false);
    let cal = CalibrationConfig {
        light_day_raw: 980,
        light_night_raw: 25,
        soil_dry_raw: [700, 710, 720],
        soil_wet_raw: [280, 290, 300],
    };
    store.save(&mut live, &cal).unwrap();

    let cells = store.eeprom().cells.clone();
    let mut rebooted = ConfigStore::new(MockEeprom::with_cells(cells));
    let mut restored = channels();
    let mut restored_cal = CalibrationConfig::default();
    rebooted.load_into(&mut restored, &mut restored_cal);

    assert_eq!(restored[1].config().frequency_minutes, 35);
    assert_eq!(restored[1].config().light_threshold, 55);
    assert_eq!(restored[0].config(), &ChannelConfig::default());
    assert_eq!(restored_cal, cal);
}

#[test]
fn save_resets_every_window_even_when_unchanged() {
    let mut store = ConfigStore::new(MockEeprom::blank());
    let mut live = channels();
    for (i, ch) in live.iter_mut().enumerate() {
        ch.stamp_last_run(1_000 * (i as u32 + 1));
    }
    store.save(&mut live, &CalibrationConfig::default()).unwrap();
    assert!(live.iter().all(|c| c.last_run_at() == 0));

    live[0].stamp_last_run(42);
    store.save(&mut live, &CalibrationConfig::default()).unwrap();
    assert_eq!(live[0].last_run_at(), 0);
    assert_eq!(store.eeprom().updates, 2);
}

#[test]
fn unreadable_part_loads_defaults() {
    let mut eeprom = MockEeprom::with_cells(vec![0x11; 64]);
    eeprom.fail_reads = true;
    let mut store = ConfigStore::new(eeprom);
    let (configs, cal) = store.load();
    assert_eq!(configs, [ChannelConfig::default(); NUM_CHANNELS]);
    assert_eq!(cal, CalibrationConfig::default());
}

#[test]
fn short_part_reports_out_of_bounds_on_save() {
    let mut store = ConfigStore::new(MockEeprom::with_cells(vec![0xFF; RECORD_LEN - 1]));
    let mut live = channels();
    live[2].stamp_last_run(7);
    assert_eq!(
        store.save(&mut live, &CalibrationConfig::default()),
        Err(StorageError::OutOfBounds)
    );
    assert_eq!(live[2].last_run_at(), 0);
    // Loading from the same part falls back to defaults.
    let (configs, _) = store.load();
    assert_eq!(configs[2], ChannelConfig::default());
}

#[test]
fn corrupt_fields_are_repaired_individually() {
    let mut cells = record::encode(
        &[ChannelConfig::default(); NUM_CHANNELS],
        &CalibrationConfig::default(),
    )
    .to_vec();
    // channel 0 frequency: misaligned
    cells[0..2].copy_from_slice(&47i16.to_le_bytes());
    // channel 1 run_secs: aligned but too long
    cells[12..14].copy_from_slice(&600i16.to_le_bytes());
    // channel 2 power: negative
    cells[24..26].copy_from_slice(&(-20i16).to_le_bytes());
    // light night: beyond the ADC range
    cells[32..34].copy_from_slice(&5000i16.to_le_bytes());

    let mut store = ConfigStore::new(MockEeprom::with_cells(cells));
    let (configs, cal) = store.load();
    assert_eq!(configs[0].frequency_minutes, 30);
    assert_eq!(configs[1].run_secs, 300);
    assert_eq!(configs[2].power, 5);
    assert_eq!(cal.light_night_raw, 1023);
    assert_eq!(cal.light_day_raw, 1023);
}
