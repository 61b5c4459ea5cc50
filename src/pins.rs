//! GPIO / peripheral pin assignments for the controller board (ESP32-S3).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

use crate::config::NUM_CHANNELS;

// ---------------------------------------------------------------------------
// Sensors: analog (ADC1)
// ---------------------------------------------------------------------------

/// LDR light sensor divider.  ADC1 channel 3 (GPIO 4).
pub const LIGHT_ADC_GPIO: i32 = 4;
pub const LIGHT_ADC_CHANNEL: u32 = 3;

/// Capacitive soil probes, one per channel.  ADC1 channels 4-6 (GPIO 5-7).
pub const SOIL_ADC_GPIO: [i32; NUM_CHANNELS] = [5, 6, 7];
pub const SOIL_ADC_CHANNEL: [u32; NUM_CHANNELS] = [4, 5, 6];

// ---------------------------------------------------------------------------
// Pumps (logic-level MOSFET low-side switches)
// ---------------------------------------------------------------------------

/// LEDC PWM outputs, one per channel.
pub const PUMP_PWM_GPIO: [i32; NUM_CHANNELS] = [11, 12, 13];

// ---------------------------------------------------------------------------
// Operator buttons (active-low with internal pull-up)
// ---------------------------------------------------------------------------

/// Advance to the next menu page.
pub const BUTTON_ADVANCE_GPIO: i32 = 14;
/// Increment / primary action.
pub const BUTTON_INCREMENT_GPIO: i32 = 15;
/// Decrement / secondary action.
pub const BUTTON_DECREMENT_GPIO: i32 = 16;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  8-bit gives 0 – 255 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 8;
/// LEDC base frequency for the pump motors (25 kHz, inaudible).
pub const PUMP_PWM_FREQ_HZ: u32 = 25_000;
