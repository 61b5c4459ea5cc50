//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the controller: poll-cycle
//! orchestration, the operator menu, and the low-power policy.  All
//! interaction with hardware happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod menu;
pub mod ports;
pub mod service;
