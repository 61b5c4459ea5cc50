//! Integration tests for the AppService → scheduler → actuators pipeline.
//!
//! These run on the host (x86_64) and drive whole poll cycles through mock
//! adapters, asserting on actuator calls and emitted events.

use super::mock_hw::{ActuatorCall, MockEeprom, MockHardware, RecordingSink};

use plantwater::app::commands::OperatorEvent;
use plantwater::app::events::AppEvent;
use plantwater::app::menu::MenuPage;
use plantwater::app::ports::StopReason;
use plantwater::app::service::AppService;
use plantwater::channel::Field;
use plantwater::config::{ChannelConfig, ControllerConfig, NUM_CHANNELS};
use plantwater::sensors::RawSamples;

const MIN: u32 = 60_000;

fn make_app(hw: &mut MockHardware) -> (AppService<MockEeprom>, RecordingSink) {
    let mut app = AppService::new(MockEeprom::factory(), ControllerConfig::default());
    let mut sink = RecordingSink::new();
    app.start(0, hw, &mut sink);
    (app, sink)
}

#[test]
fn start_loads_defaults_and_silences_pumps() {
    let mut hw = MockHardware::new();
    let (app, sink) = make_app(&mut hw);

    assert_eq!(hw.calls, vec![ActuatorCall::AllOff]);
    assert!(matches!(sink.events[..], [AppEvent::Started]));
    assert!(app.state().channels.iter().all(|c| *c.config() == ChannelConfig::default()));
    assert_eq!(app.menu_page(), MenuPage::Home { channel: 0 });
}

#[test]
fn thirsty_channels_water_for_run_duration() {
    let mut hw = MockHardware::thirsty();
    let (mut app, mut sink) = make_app(&mut hw);

    app.poll(30 * MIN - 1, &mut hw, &mut sink);
    assert!(!app.state().any_running(), "window not yet elapsed");

    app.poll(30 * MIN, &mut hw, &mut sink);
    for ch in 0..NUM_CHANNELS {
        assert_eq!(hw.duty(ch), 80, "channel {ch} should run at default power");
    }
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::PumpStarted { manual: false, .. })),
        NUM_CHANNELS
    );

    app.poll(30 * MIN + 29_999, &mut hw, &mut sink);
    assert!(app.state().any_running());

    app.poll(30 * MIN + 30_000, &mut hw, &mut sink);
    assert!(!app.state().any_running());
    for ch in 0..NUM_CHANNELS {
        assert_eq!(hw.duty(ch), 0);
    }
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::PumpStopped { reason: StopReason::RunComplete, .. })),
        NUM_CHANNELS
    );
}

#[test]
fn wet_soil_skips_a_whole_window() {
    let mut hw = MockHardware::new();
    hw.raw = RawSamples { light: 900, soil: [900; NUM_CHANNELS] };
    let (mut app, mut sink) = make_app(&mut hw);

    app.poll(30 * MIN, &mut hw, &mut sink);
    assert!(!app.state().any_running());
    assert!(app.state().channels.iter().all(|c| c.last_run_at() == 30 * MIN));

    // Soil dries out, but the window restarted at the gated check.
    hw.raw.soil = [0; NUM_CHANNELS];
    for t in [31 * MIN, 45 * MIN, 60 * MIN - 1] {
        app.poll(t, &mut hw, &mut sink);
    }
    assert!(!app.state().any_running());
    app.poll(60 * MIN, &mut hw, &mut sink);
    assert!(app.state().any_running());
}

#[test]
fn save_makes_every_channel_due_again() {
    let mut hw = MockHardware::thirsty();
    let (mut app, mut sink) = make_app(&mut hw);

    app.poll(30 * MIN, &mut hw, &mut sink);
    app.poll(30 * MIN + 30_000, &mut hw, &mut sink);
    assert!(!app.state().any_running());

    app.save(&mut sink);
    assert!(sink.events.iter().any(|e| matches!(e, AppEvent::ConfigSaved)));
    assert!(app.state().channels.iter().all(|c| c.last_run_at() == 0));

    app.poll(35 * MIN, &mut hw, &mut sink);
    assert!(app.state().any_running(), "save reset must be visible to the next cycle");
}

#[test]
fn failed_save_keeps_running_on_memory_config() {
    let mut hw = MockHardware::thirsty();
    let mut app = AppService::new(
        MockEeprom { fail_writes: true, ..MockEeprom::factory() },
        ControllerConfig::default(),
    );
    let mut sink = RecordingSink::new();
    app.start(0, &mut hw, &mut sink);
    app.state_mut().channels[0].adjust(Field::Power, false);
    app.state_mut().channels[0].stamp_last_run(10 * MIN);

    app.save(&mut sink);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ConfigSaveFailed)), 1);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ConfigSaved)), 0);
    assert_eq!(app.state().channels[0].config().power, 75);
    assert_eq!(app.state().channels[0].last_run_at(), 0);
    assert_eq!(app.store().eeprom().updates, 0);
}

#[test]
fn home_increment_toggles_manual_run_without_stamping() {
    let mut hw = MockHardware::new();
    let (mut app, mut sink) = make_app(&mut hw);

    app.handle_operator(OperatorEvent::Increment, 1_000, &mut hw, &mut sink);
    assert!(app.state().channels[0].is_running());
    assert_eq!(app.state().channels[0].last_run_at(), 0);
    assert_eq!(hw.duty(0), 80);
    assert!(sink.events.iter().any(|e| matches!(e, AppEvent::PumpStarted { channel: 0, manual: true, .. })));

    app.handle_operator(OperatorEvent::Increment, 2_000, &mut hw, &mut sink);
    assert!(!app.state().channels[0].is_running());
    assert_eq!(hw.duty(0), 0);
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::PumpStopped { channel: 0, reason: StopReason::Manual }
    )));
}

#[test]
fn manual_run_is_cut_off_by_the_scheduler() {
    let mut hw = MockHardware::new();
    let (mut app, mut sink) = make_app(&mut hw);

    app.handle_operator(OperatorEvent::Decrement, 500, &mut hw, &mut sink);
    app.handle_operator(OperatorEvent::Increment, 1_000, &mut hw, &mut sink);
    assert!(app.state().channels[1].is_running());

    app.poll(31_000, &mut hw, &mut sink);
    assert!(!app.state().channels[1].is_running());
    assert_eq!(hw.duty(1), 0);
}

#[test]
fn idle_controller_sleeps_and_wakes_on_press() {
    let mut hw = MockHardware::new();
    let (mut app, mut sink) = make_app(&mut hw);
    let config = ControllerConfig::default();

    app.poll(14_999, &mut hw, &mut sink);
    assert!(!app.is_sleeping());
    assert_eq!(app.next_wait_ms(), config.poll_interval_ms);

    app.poll(15_000, &mut hw, &mut sink);
    assert!(app.is_sleeping());
    assert_eq!(app.next_wait_ms(), config.sleep_poll_interval_ms);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Sleeping)), 1);

    // The waking press is not applied to the menu.
    app.handle_operator(OperatorEvent::Advance, 16_000, &mut hw, &mut sink);
    assert!(!app.is_sleeping());
    assert_eq!(app.menu_page(), MenuPage::Home { channel: 0 });
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Woke)), 1);

    app.handle_operator(OperatorEvent::Advance, 16_500, &mut hw, &mut sink);
    assert!(matches!(app.menu_page(), MenuPage::Settings { channel: 0, .. }));
}

#[test]
fn running_pump_keeps_controller_awake() {
    let mut hw = MockHardware::new();
    let (mut app, mut sink) = make_app(&mut hw);

    app.handle_operator(OperatorEvent::Increment, 0, &mut hw, &mut sink);
    app.poll(20_000, &mut hw, &mut sink);
    assert!(!app.is_sleeping());
    assert!(!app.should_sleep(20_000));
}

#[test]
fn telemetry_is_periodic_and_serializable() {
    let mut hw = MockHardware::new();
    let (mut app, mut sink) = make_app(&mut hw);

    app.poll(59_999, &mut hw, &mut sink);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Telemetry(_))), 0);
    app.poll(60_000, &mut hw, &mut sink);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Telemetry(_))), 1);

    let telemetry = app.build_telemetry(60_000);
    assert_eq!(telemetry.seconds_to_next_run, [1_740; NUM_CHANNELS]);
    let json = serde_json::to_string(&telemetry).unwrap();
    assert!(json.contains("\"pump_duty\":[0,0,0]"), "{json}");
}

#[test]
fn pwm_failure_does_not_stop_the_schedule() {
    let mut hw = MockHardware::thirsty();
    let (mut app, mut sink) = make_app(&mut hw);
    hw.fail_pwm = true;

    app.poll(30 * MIN, &mut hw, &mut sink);
    assert!(app.state().any_running());
    assert_eq!(sink.count(|e| matches!(e, AppEvent::PumpStarted { .. })), NUM_CHANNELS);
    assert_eq!(hw.duty(0), 0);
}

#[test]
fn rejected_pump_write_is_retried_next_cycle() {
    let mut hw = MockHardware::thirsty();
    let (mut app, mut sink) = make_app(&mut hw);
    hw.fail_pwm = true;
    app.poll(30 * MIN, &mut hw, &mut sink);

    hw.fail_pwm = false;
    app.poll(30 * MIN + 50, &mut hw, &mut sink);
    for ch in 0..NUM_CHANNELS {
        assert_eq!(hw.duty(ch), 80, "channel {ch} should be driven once the PWM recovers");
    }

    // Unchanged duties are not rewritten.
    let writes = hw.calls.len();
    app.poll(30 * MIN + 100, &mut hw, &mut sink);
    assert_eq!(hw.calls.len(), writes);
}

#[test]
fn start_all_runs_every_channel() {
    let mut hw = MockHardware::new();
    let (mut app, mut sink) = make_app(&mut hw);

    app.start_all(5_000, &mut hw, &mut sink);
    assert!(app.state().channels.iter().all(|c| c.is_running() && c.last_run_at() == 5_000));
    for ch in 0..NUM_CHANNELS {
        assert_eq!(hw.duty(ch), 80);
    }
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::PumpStarted { manual: true, .. })),
        NUM_CHANNELS
    );
}
