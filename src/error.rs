//! Unified error types for the plant-watering firmware.
//!
//! A single `Error` enum that every subsystem can convert into.  Boot code
//! returns [`Result`] and `main()` lifts it into `anyhow`.  All variants are `Copy` so they pass
//! through the control loop without allocation.
//!
//! The control loop itself never fails: adapters return these errors and
//! the [`AppService`](crate::app::service::AppService) recovers locally.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A pump command failed.
    Actuator(ActuatorError),
    /// The configuration block could not be read or written.
    Storage(StorageError),
    /// Peripheral initialisation failed.
    Init(HwInitError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Init(e) => write!(f, "init: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// PWM duty-cycle write failed.
    PwmWriteFailed,
    /// Channel index has no pump attached.
    NoSuchChannel,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PwmWriteFailed => write!(f, "PWM write failed"),
            Self::NoSuchChannel => write!(f, "no such channel"),
        }
    }
}

impl core::error::Error for ActuatorError {}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Address range lies outside the device.
    OutOfBounds,
    /// Generic I/O error from the backing store.
    IoError,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds => write!(f, "address out of bounds"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::error::Error for StorageError {}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Peripheral init errors
// ---------------------------------------------------------------------------

/// Peripheral that refused its configuration, with the ESP-IDF return code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    Adc(i32),
    Buttons(i32),
    Pwm(i32),
    IsrService(i32),
}

impl fmt::Display for HwInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (what, rc) = match *self {
            Self::Adc(rc) => ("sensor ADC", rc),
            Self::Buttons(rc) => ("button GPIO", rc),
            Self::Pwm(rc) => ("pump PWM", rc),
            Self::IsrService(rc) => ("button ISR service", rc),
        };
        write!(f, "{what} setup rejected (esp_err={rc})")
    }
}

impl core::error::Error for HwInitError {}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
