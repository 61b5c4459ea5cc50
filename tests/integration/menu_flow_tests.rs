//! Operator menu flows driven through the AppService: editing, saving,
//! reverting and calibration capture.

use super::mock_hw::{MockEeprom, MockHardware, RecordingSink};

use plantwater::app::commands::OperatorEvent::{self, Advance, Decrement, Increment};
use plantwater::app::events::AppEvent;
use plantwater::app::menu::{CalibrationPoint, MenuPage, SettingsPage};
use plantwater::app::service::AppService;
use plantwater::channel::Field;
use plantwater::config::{ControllerConfig, NUM_CHANNELS};
use plantwater::store::record;
use plantwater::store::{Decoded, RECORD_LEN};

struct Rig {
    app: AppService<MockEeprom>,
    hw: MockHardware,
    sink: RecordingSink,
    now: u32,
}

impl Rig {
    fn new() -> Self {
        let mut hw = MockHardware::new();
        let mut sink = RecordingSink::new();
        let mut app = AppService::new(MockEeprom::factory(), ControllerConfig::default());
        app.start(0, &mut hw, &mut sink);
        Self { app, hw, sink, now: 0 }
    }

    fn press(&mut self, event: OperatorEvent) {
        self.now += 250;
        self.app.handle_operator(event, self.now, &mut self.hw, &mut self.sink);
    }

    fn press_n(&mut self, event: OperatorEvent, n: usize) {
        for _ in 0..n {
            self.press(event);
        }
    }

    fn poll(&mut self) {
        self.now += 50;
        self.app.poll(self.now, &mut self.hw, &mut self.sink);
    }

    fn page(&self) -> MenuPage {
        self.app.menu_page()
    }

    fn stored(&self) -> Decoded {
        let cells = &self.app.store().eeprom().cells;
        let block: [u8; RECORD_LEN] = cells[..RECORD_LEN].try_into().unwrap();
        record::decode(&block)
    }
}

fn settings(channel: usize, page: SettingsPage) -> MenuPage {
    MenuPage::Settings { channel, page }
}

#[test]
fn advance_walks_every_channel_then_light_calibration() {
    let mut rig = Rig::new();
    rig.press(Advance);

    let order = [
        SettingsPage::Frequency,
        SettingsPage::RunSeconds,
        SettingsPage::Power,
        SettingsPage::SoilThreshold,
        SettingsPage::LightThreshold,
        SettingsPage::CalibrateSoil,
        SettingsPage::Save,
    ];
    for ch in 0..NUM_CHANNELS {
        for page in order {
            assert_eq!(rig.page(), settings(ch, page));
            rig.press(Advance);
        }
    }
    assert_eq!(rig.page(), settings(NUM_CHANNELS - 1, SettingsPage::CalibrateLight));
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::ConfigReverted)), NUM_CHANNELS);

    rig.press(Advance);
    assert_eq!(rig.page(), MenuPage::Home { channel: 0 });
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::ConfigSaved)), 1);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::MenuChanged(_))),
        1 + NUM_CHANNELS * order.len() + 1
    );
}

#[test]
fn increment_on_save_page_persists_edits() {
    let mut rig = Rig::new();
    rig.press(Advance);
    rig.press(Increment);
    assert!(rig.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::FieldChanged { channel: 0, field: Field::Frequency, value: 35 }
    )));

    rig.press_n(Advance, 6);
    assert_eq!(rig.page(), settings(0, SettingsPage::Save));
    rig.press(Increment);

    assert_eq!(rig.page(), settings(1, SettingsPage::Frequency));
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::ConfigSaved)), 1);
    let (channels, _) = rig.stored();
    assert_eq!(channels[0].frequency_minutes, 35);
    assert_eq!(channels[1].frequency_minutes, 30);
}

#[test]
fn advance_past_save_page_discards_edits() {
    let mut rig = Rig::new();
    rig.press_n(Advance, 3);
    assert_eq!(rig.page(), settings(0, SettingsPage::Power));
    rig.press_n(Decrement, 2);
    assert_eq!(rig.app.state().channels[0].config().power, 70);

    rig.press_n(Advance, 5);
    assert_eq!(rig.page(), settings(1, SettingsPage::Frequency));
    assert_eq!(rig.app.state().channels[0].config().power, 80);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::ConfigReverted)), 1);
    assert_eq!(rig.app.store().eeprom().updates, 0);
}

#[test]
fn decrement_on_save_page_leaves_edits_unsaved() {
    let mut rig = Rig::new();
    rig.press_n(Advance, 2);
    rig.press(Increment);
    rig.press_n(Advance, 5);
    assert_eq!(rig.page(), settings(0, SettingsPage::Save));

    rig.press(Decrement);
    assert_eq!(rig.page(), MenuPage::Home { channel: 0 });
    assert_eq!(rig.app.state().channels[0].config().run_secs, 35);
    assert_eq!(rig.app.store().eeprom().updates, 0);
}

#[test]
fn field_edits_saturate_at_limits() {
    let mut rig = Rig::new();
    rig.press_n(Advance, 4);
    assert_eq!(rig.page(), settings(0, SettingsPage::SoilThreshold));
    rig.press_n(Increment, 30);
    assert_eq!(rig.app.state().channels[0].config().soil_threshold, 100);
    rig.press_n(Decrement, 30);
    assert_eq!(rig.app.state().channels[0].config().soil_threshold, 0);
}

#[test]
fn power_edit_reaches_a_running_pump() {
    let mut rig = Rig::new();
    rig.press(Increment);
    assert_eq!(rig.hw.duty(0), 80);

    rig.press_n(Advance, 3);
    assert_eq!(rig.page(), settings(0, SettingsPage::Power));
    rig.press_n(Decrement, 4);
    assert!(rig.app.state().channels[0].is_running());
    assert_eq!(rig.hw.duty(0), 60);

    rig.poll();
    assert_eq!(rig.hw.duty(0), 60);
    assert_eq!(rig.app.state().duties()[0], 60);
}

#[test]
fn soil_calibration_captures_latest_reading() {
    let mut rig = Rig::new();
    rig.hw.raw.soil = [870, 10, 10];
    rig.poll();
    rig.press_n(Advance, 6);
    assert_eq!(rig.page(), settings(0, SettingsPage::CalibrateSoil));

    rig.press(Increment);
    rig.hw.raw.soil[0] = 310;
    rig.poll();
    rig.press(Decrement);

    let cal = rig.app.state().calibration;
    assert_eq!(cal.soil_dry_raw[0], 870);
    assert_eq!(cal.soil_wet_raw[0], 310);
    assert!(rig.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::Calibrated { point: CalibrationPoint::SoilWet { channel: 0 }, raw: 310 }
    )));
}

#[test]
fn light_calibration_is_saved_on_exit() {
    let mut rig = Rig::new();
    rig.press(Advance);
    for _ in 0..NUM_CHANNELS {
        rig.press_n(Advance, 6);
        rig.press(Increment);
    }
    assert_eq!(rig.page(), settings(NUM_CHANNELS - 1, SettingsPage::CalibrateLight));

    rig.hw.raw.light = 955;
    rig.poll();
    rig.press(Increment);
    rig.hw.raw.light = 40;
    rig.poll();
    rig.press(Decrement);
    rig.press(Advance);

    assert_eq!(rig.page(), MenuPage::Home { channel: 0 });
    let (_, cal) = rig.stored();
    assert_eq!(cal.light_day_raw, 955);
    assert_eq!(cal.light_night_raw, 40);
}
