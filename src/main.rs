//! PlantWater firmware entry point
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   NvsEeprom    MillisClock     │
//! │  (Sensor+Actuator) (EventSink)    (EepromPort) (time)          │
//! │  ChannelWakeSource (button ISRs / console → WakeSource)        │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  SchedulerState · Menu · ConfigStore                   │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each iteration: poll (sensors → schedule → pumps), feed the watchdog,
//! then wait for an operator event or the poll interval.
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info, warn};

use plantwater::adapters::hardware::HardwareAdapter;
use plantwater::adapters::log_sink::LogEventSink;
use plantwater::adapters::nvs::{NvsEeprom, EEPROM_SIZE, ERASED};
use plantwater::adapters::time::MillisClock;
use plantwater::adapters::wake::ChannelWakeSource;
use plantwater::app::ports::{Wake, WakeSource};
use plantwater::app::service::AppService;
use plantwater::config::ControllerConfig;
use plantwater::drivers::{hw_init, watchdog::Watchdog};

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Platform bootstrap + logging ───────────────────────
    init_logging()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  PlantWater v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals()?;
    if let Err(e) = hw_init::init_isr_service() {
        error!("ISR service init failed: {}, buttons disabled", e);
    }
    let mut watchdog = Watchdog::default();

    // ── 3. Persistent storage ─────────────────────────────────
    let eeprom = match NvsEeprom::new() {
        Ok(e) => e,
        Err(e) => {
            warn!("EEPROM init failed ({}), running without persistence", e);
            NvsEeprom::with_image(vec![ERASED; EEPROM_SIZE])
        }
    };

    // ── 4. Adapters + service ─────────────────────────────────
    let clock = MillisClock::new();
    let mut hw = HardwareAdapter::new();
    let mut sink = LogEventSink::new();
    let mut wake = ChannelWakeSource::new();
    let mut app = AppService::new(eeprom, ControllerConfig::default());

    #[cfg(not(target_os = "espidf"))]
    sim::start_console();

    app.start(clock.now_ms(), &mut hw, &mut sink);

    // ── 5. Control loop ───────────────────────────────────────
    loop {
        #[cfg(not(target_os = "espidf"))]
        if sim::take_start_all() {
            app.start_all(clock.now_ms(), &mut hw, &mut sink);
        }

        app.poll(clock.now_ms(), &mut hw, &mut sink);
        watchdog.feed();

        if let Wake::Operator(event) = wake.wait(app.next_wait_ms()) {
            app.handle_operator(event, clock.now_ms(), &mut hw, &mut sink);
        }
    }
}

#[cfg(target_os = "espidf")]
fn init_logging() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn init_logging() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init()?;
    Ok(())
}

// ── Host simulation console ───────────────────────────────────
//
// Reads stdin lines on a helper thread:
//
//   a / + / -        Advance / Increment / Decrement
//   l <raw>          light ADC (0-1023)
//   s <ch> <raw>     soil ADC of channel <ch>
//   g                start every pump now
//   q                quit

#[cfg(not(target_os = "espidf"))]
mod sim {
    use std::io::BufRead;
    use std::sync::atomic::{AtomicBool, Ordering};

    use log::{info, warn};

    use plantwater::adapters::wake::push_operator_event;
    use plantwater::app::commands::OperatorEvent;
    use plantwater::config::NUM_CHANNELS;
    use plantwater::sensors::{sim_set_light_adc, sim_set_soil_adc};

    static START_ALL: AtomicBool = AtomicBool::new(false);

    pub fn take_start_all() -> bool {
        START_ALL.swap(false, Ordering::Relaxed)
    }

    pub fn start_console() {
        // A bright, dry garden so something happens on the first window.
        sim_set_light_adc(800);
        for ch in 0..NUM_CHANNELS {
            sim_set_soil_adc(ch, 250);
        }

        let spawned = std::thread::Builder::new()
            .name("console".into())
            .spawn(|| {
                let stdin = std::io::stdin();
                for line in stdin.lock().lines() {
                    let Ok(line) = line else { break };
                    handle_line(line.trim());
                }
            });
        match spawned {
            Ok(_) => info!("sim: console ready (a/+/- buttons, l <raw>, s <ch> <raw>, g, q)"),
            Err(e) => warn!("sim: console thread failed: {}", e),
        }
    }

    fn handle_line(line: &str) {
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some("l"), Some(raw), None) => match raw.parse() {
                Ok(raw) => sim_set_light_adc(raw),
                Err(_) => warn!("sim: bad light value '{}'", raw),
            },
            (Some("s"), Some(ch), Some(raw)) => match (ch.parse(), raw.parse()) {
                (Ok(ch), Ok(raw)) => sim_set_soil_adc(ch, raw),
                _ => warn!("sim: bad soil command '{}'", line),
            },
            (Some("g"), None, None) => START_ALL.store(true, Ordering::Relaxed),
            (Some("q"), None, None) => std::process::exit(0),
            _ => {
                for key in line.chars() {
                    match OperatorEvent::from_key(key) {
                        Some(event) => {
                            if !push_operator_event(event) {
                                warn!("sim: operator queue full, dropped {:?}", event);
                            }
                        }
                        None => warn!("sim: unknown key '{}'", key),
                    }
                }
            }
        }
    }
}
