//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to                   |
//! |------------|--------------------|-------------------------------|
//! | `hardware` | SensorPort         | ESP32 ADC1                    |
//! |            | ActuatorPort       | ESP32 LEDC PWM                |
//! | `log_sink` | EventSink          | Serial log output             |
//! | `nvs`      | EepromPort         | NVS blob / in-memory image    |
//! | `time`     | (clock only)       | ESP32 system timer            |
//! | `wake`     | WakeSource         | Button ISRs / stdin thread    |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;
pub mod wake;
