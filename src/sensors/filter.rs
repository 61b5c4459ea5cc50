//! Exponential moving average over normalized sensor readings.
//!
//! The filter is a pure function of the previous output and the new
//! sample; callers keep the returned value as the next `previous`.

/// Weight of the new sample, out of [`ALPHA_SCALE`].
pub const ALPHA: u32 = 30;
pub const ALPHA_SCALE: u32 = 100;

/// Smooth `sample` against `previous`.
///
/// `previous == 0` marks an unfilled filter and returns `sample` as-is, so
/// the first reading after boot is not dragged toward zero.  A genuine
/// reading of 0 is therefore never smoothed; the next non-zero sample
/// restarts the filter.
pub const fn filter(previous: u8, sample: u8) -> u8 {
    if previous == 0 {
        return sample;
    }
    ((ALPHA * sample as u32 + (ALPHA_SCALE - ALPHA) * previous as u32) / ALPHA_SCALE) as u8
}
