//! Millisecond timestamps and wrap-safe arithmetic.
//!
//! The controller's clock is a free-running `u32` millisecond counter that
//! wraps after ~49.7 days.  All interval math goes through these helpers so
//! that wraparound behaviour is explicit modular arithmetic rather than an
//! accident of integer overflow.

/// Monotonic milliseconds since boot, wrapping at 2^32.
pub type Millis = u32;

/// Milliseconds from `since` to `now`, modulo 2^32.
#[inline]
pub const fn elapsed(now: Millis, since: Millis) -> u32 {
    now.wrapping_sub(since)
}

/// Whether at least `duration` ms have passed between `start` and `now`.
///
/// Correct across a single wrap of the counter.
#[inline]
pub const fn deadline_reached(now: Millis, start: Millis, duration: u32) -> bool {
    elapsed(now, start) >= duration
}

/// Milliseconds from `now` until `start + duration`, modulo 2^32.
///
/// Wraps to a large value once the deadline has passed; callers that only
/// display the result accept this.
#[inline]
pub const fn remaining(now: Millis, start: Millis, duration: u32) -> u32 {
    start.wrapping_add(duration).wrapping_sub(now)
}
