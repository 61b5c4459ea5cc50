//! Application service, the hexagonal core.
//!
//! [`AppService`] owns the [`SchedulerState`], the operator [`Menu`] and
//! the [`ConfigStore`].  It exposes a hardware-agnostic API.  All I/O
//! flows through port traits injected at call sites, making the entire
//! service testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!                 │        AppService          │
//! ActuatorPort ◀──│  Scheduler · Menu · Store  │ ◀──▶ EepromPort
//!                 └────────────────────────────┘
//!                              ▲
//!                     OperatorEvent (WakeSource)
//! ```

use log::{debug, info, warn};

use crate::config::{ControllerConfig, NUM_CHANNELS};
use crate::scheduler::SchedulerState;
use crate::store::ConfigStore;
use crate::time::{self, Millis};

use super::commands::OperatorEvent;
use super::events::{AppEvent, TelemetryData};
use super::menu::{Menu, MenuEffect, MenuPage};
use super::ports::{ActuatorPort, EepromPort, EventSink, SchedulerDelegate, SensorPort, StopReason};

// ───────────────────────────────────────────────────────────────
// Scheduler delegate
// ───────────────────────────────────────────────────────────────

/// Reports scheduler transitions on the event sink.  The pumps themselves
/// are driven from channel state by [`AppService::drive_pumps`].
struct PumpDelegate<'a, S: EventSink> {
    sink: &'a mut S,
    /// Starts requested by the operator rather than the schedule.
    manual: bool,
}

impl<S: EventSink> SchedulerDelegate for PumpDelegate<'_, S> {
    fn on_pump_started(&mut self, channel: usize, duty: u8) {
        self.sink.emit(&AppEvent::PumpStarted { channel, duty, manual: self.manual });
    }

    fn on_pump_stopped(&mut self, channel: usize, reason: StopReason) {
        self.sink.emit(&AppEvent::PumpStopped { channel, reason });
    }
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService<E: EepromPort> {
    state: SchedulerState,
    menu: Menu,
    store: ConfigStore<E>,
    config: ControllerConfig,
    last_operator_at: Millis,
    last_telemetry_at: Millis,
    sleeping: bool,
    cycle_count: u64,
    /// Duty last accepted by each pump; `None` until a write succeeds.
    applied: [Option<u8>; NUM_CHANNELS],
}

impl<E: EepromPort> AppService<E> {
    /// Construct the service around its EEPROM.
    ///
    /// Does **not** load configuration; call [`start`](Self::start) next.
    pub fn new(eeprom: E, config: ControllerConfig) -> Self {
        Self {
            state: SchedulerState::new(),
            menu: Menu::new(),
            store: ConfigStore::new(eeprom),
            config,
            last_operator_at: 0,
            last_telemetry_at: 0,
            sleeping: false,
            cycle_count: 0,
            applied: [None; NUM_CHANNELS],
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Load the stored configuration and begin operating at `now`.
    pub fn start(&mut self, now: Millis, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        hw.all_off();
        self.applied = [Some(0); NUM_CHANNELS];
        self.store.load_into(&mut self.state.channels, &mut self.state.calibration);
        self.last_operator_at = now;
        self.last_telemetry_at = now;
        sink.emit(&AppEvent::Started);
        info!("AppService started");
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one poll cycle: read sensors → schedule → pumps.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`]; this avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn poll(&mut self, now: Millis, hw: &mut (impl SensorPort + ActuatorPort), sink: &mut impl EventSink) {
        self.cycle_count += 1;

        // 1. Sensors
        let raw = hw.read_raw();
        self.state.update_sensors(raw);

        // 2. Schedule
        self.state.check_schedule(now, &mut PumpDelegate { sink: &mut *sink, manual: false });

        // 3. Pumps follow channel state every cycle
        self.drive_pumps(hw);

        // 4. Low-power policy
        let should_sleep = self.should_sleep(now);
        if should_sleep && !self.sleeping {
            hw.all_off();
            self.applied = [Some(0); NUM_CHANNELS];
            info!("AppService: idle, entering low-power polling");
            sink.emit(&AppEvent::Sleeping);
        }
        self.sleeping = should_sleep;

        // 5. Telemetry
        if time::deadline_reached(now, self.last_telemetry_at, self.config.telemetry_interval_ms) {
            self.last_telemetry_at = now;
            sink.emit(&AppEvent::Telemetry(self.build_telemetry(now)));
        }
    }

    // ── Operator input ────────────────────────────────────────

    /// Process one debounced button press.
    ///
    /// A press that arrives while sleeping only wakes the controller.
    pub fn handle_operator(
        &mut self,
        event: OperatorEvent,
        now: Millis,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        self.last_operator_at = now;
        if self.sleeping {
            self.sleeping = false;
            info!("AppService: woken by {event:?}");
            sink.emit(&AppEvent::Woke);
            return;
        }

        let before = self.menu.page();
        let effect = self.menu.handle(event, &mut self.state);
        self.apply_effect(effect, now, sink);

        let after = self.menu.page();
        if after != before {
            sink.emit(&AppEvent::MenuChanged(after));
        }
        self.drive_pumps(hw);
    }

    /// Write each channel's duty to its pump when it differs from the last
    /// accepted write.  A failed write is retried on the next call.
    fn drive_pumps(&mut self, hw: &mut impl ActuatorPort) {
        for (channel, duty) in self.state.duties().into_iter().enumerate() {
            if self.applied[channel] == Some(duty) {
                continue;
            }
            match hw.set_pump_duty(channel, duty) {
                Ok(()) => self.applied[channel] = Some(duty),
                Err(e) => {
                    warn!("AppService: pump {channel} duty {duty} not applied: {e}");
                    self.applied[channel] = None;
                }
            }
        }
    }

    fn apply_effect(&mut self, effect: MenuEffect, now: Millis, sink: &mut impl EventSink) {
        match effect {
            MenuEffect::None => {}
            MenuEffect::Adjusted { channel, field, value } => {
                debug!("AppService: channel {channel} {field:?} = {value}");
                sink.emit(&AppEvent::FieldChanged { channel, field, value });
            }
            MenuEffect::Calibrated { point, raw } => {
                info!("AppService: calibrated {point:?} = {raw}");
                sink.emit(&AppEvent::Calibrated { point, raw });
            }
            MenuEffect::Save => self.save(sink),
            MenuEffect::Revert => {
                self.store.load_into(&mut self.state.channels, &mut self.state.calibration);
                info!("AppService: unsaved edits discarded");
                sink.emit(&AppEvent::ConfigReverted);
            }
            MenuEffect::ToggleRun { channel } => self.toggle_run(channel, now, sink),
        }
    }

    /// Persist the live configuration.  Every channel becomes due.
    pub fn save(&mut self, sink: &mut impl EventSink) {
        match self.store.save(&mut self.state.channels, &self.state.calibration) {
            Ok(()) => sink.emit(&AppEvent::ConfigSaved),
            Err(e) => {
                warn!("AppService: config save failed: {e}");
                sink.emit(&AppEvent::ConfigSaveFailed);
            }
        }
    }

    /// Manual start/stop of one channel.  Does not touch its frequency
    /// window.
    fn toggle_run(&mut self, channel: usize, now: Millis, sink: &mut impl EventSink) {
        let mut delegate = PumpDelegate { sink, manual: true };
        let Some(pump) = self.state.channels.get_mut(channel) else {
            return;
        };
        if pump.is_running() {
            pump.stop();
            info!("AppService: channel {channel} stopped by operator");
            delegate.on_pump_stopped(channel, StopReason::Manual);
        } else {
            pump.start(now);
            info!("AppService: channel {channel} started by operator");
            delegate.on_pump_started(channel, pump.duty());
        }
    }

    /// Operator command: start every channel now, restarting their
    /// frequency windows.
    pub fn start_all(&mut self, now: Millis, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        self.state.start_all(now, &mut PumpDelegate { sink, manual: true });
        self.drive_pumps(hw);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Whether the loop may drop to low-power polling.
    pub fn should_sleep(&self, now: Millis) -> bool {
        time::deadline_reached(now, self.last_operator_at, self.config.idle_sleep_after_ms)
            && !self.state.any_running()
    }

    /// How long the loop should wait for input before the next cycle.
    pub fn next_wait_ms(&self) -> u32 {
        if self.sleeping {
            self.config.sleep_poll_interval_ms
        } else {
            self.config.poll_interval_ms
        }
    }

    /// Build a telemetry snapshot from the current state.
    pub fn build_telemetry(&self, now: Millis) -> TelemetryData {
        TelemetryData {
            uptime_ms: now,
            sensors: self.state.snapshot,
            pump_duty: self.state.duties(),
            seconds_to_next_run: core::array::from_fn(|i| {
                self.state.channels[i].seconds_to_next_run(now)
            }),
            sleeping: self.sleeping,
        }
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    /// Mutable access for boot-time overrides and tests.
    pub fn state_mut(&mut self) -> &mut SchedulerState {
        &mut self.state
    }

    pub fn menu_page(&self) -> MenuPage {
        self.menu.page()
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Poll cycles executed since startup.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn store(&self) -> &ConfigStore<E> {
        &self.store
    }
}
