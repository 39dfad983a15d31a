//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the rules of the pump: the button-gated phase
//! sequencer and the serial pulse-train runner.  All interaction with
//! hardware happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod pulse_mode;
pub mod service;
