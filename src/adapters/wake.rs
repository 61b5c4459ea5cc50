//! Operator-event wake source.
//!
//! Bridges button interrupts (or the simulation's stdin thread) with the
//! synchronous control loop through a static `embassy-sync` channel.
//!
//! ```text
//! ┌──────────────┐  OperatorEvent  ┌──────────────┐
//! │ GPIO ISR /   │───────────────▶│ Control loop  │
//! │ stdin thread │  (bounded, 8)   │ wait(timeout) │
//! └──────────────┘                 └──────────────┘
//! ```

use core::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::app::commands::OperatorEvent;
use crate::app::ports::{Wake, WakeSource};

/// Channel depth for pending operator events.
const EVENT_DEPTH: usize = 8;

/// Presses closer together than this are contact bounce.
pub const PRESS_LOCKOUT_MS: u32 = 200;

/// How often the wait re-checks the channel.
const WAIT_SLICE_MS: u64 = 10;

/// Inbound operator events: ISR / input thread → control loop.
pub static OPERATOR_EVENTS: Channel<CriticalSectionRawMutex, OperatorEvent, EVENT_DEPTH> = Channel::new();

static LAST_PRESS_MS: AtomicU32 = AtomicU32::new(0);

/// Queue an event.  Returns `false` if the queue is full and it was dropped.
pub fn push_operator_event(event: OperatorEvent) -> bool {
    OPERATOR_EVENTS.try_send(event).is_ok()
}

/// ISR entry point: queue `event` unless it falls inside the lockout
/// window of the previous accepted press.  Lock-free.
pub fn notify_from_isr(event: OperatorEvent, now_ms: u32) -> bool {
    let last = LAST_PRESS_MS.load(Ordering::Relaxed);
    if now_ms.wrapping_sub(last) < PRESS_LOCKOUT_MS {
        return false;
    }
    LAST_PRESS_MS.store(now_ms, Ordering::Relaxed);
    push_operator_event(event)
}

/// [`WakeSource`] draining [`OPERATOR_EVENTS`].
#[derive(Default)]
pub struct ChannelWakeSource;

impl ChannelWakeSource {
    pub fn new() -> Self {
        Self
    }
}

impl WakeSource for ChannelWakeSource {
    fn wait(&mut self, timeout_ms: u32) -> Wake {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms as u64);
        loop {
            if let Ok(event) = OPERATOR_EVENTS.try_receive() {
                return Wake::Operator(event);
            }
            let now = Instant::now();
            if now >= deadline {
                return Wake::Timeout;
            }
            let slice = Duration::from_millis(WAIT_SLICE_MS).min(deadline - now);
            std::thread::sleep(slice);
        }
    }
}
