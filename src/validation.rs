//! Range validation for stored and tunable values.
//!
//! Both functions are total: every input maps to an in-range output, so a
//! corrupted EEPROM cell can never leak an out-of-range value into the
//! scheduler.

use crate::config::FieldLimits;

/// Constrain `value` to `[low, high]`.
pub const fn clamp(value: i32, low: i32, high: i32) -> i32 {
    if value < low {
        low
    } else if value > high {
        high
    } else {
        value
    }
}

/// Clamp a step-aligned value, or fall back to `default`.
///
/// The alignment check runs on the raw `value`: a multiple of `step` that
/// lies out of range is clamped to the nearest bound, while a value that is
/// not a multiple of `step` is replaced by `default` even when it is in
/// range.  Load-time repair depends on this asymmetry.
pub const fn clamp_step(value: i32, low: i32, high: i32, step: i32, default: i32) -> i32 {
    if value % step == 0 {
        clamp(value, low, high)
    } else {
        default
    }
}

/// [`clamp_step`] driven by a field's [`FieldLimits`].
///
/// Aligned out-of-range values clamp to the nearest aligned bound, so a
/// repaired value is always a multiple of the field's step.
pub const fn repair(value: i32, limits: FieldLimits) -> i32 {
    clamp_step(value, limits.floor(), limits.ceiling(), limits.step, limits.default)
}
