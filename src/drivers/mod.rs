//! Actuator and input drivers over embedded-hal pins.

pub mod button;
pub mod pump;
pub mod soft_pwm;
pub mod solenoid;
pub mod status_led;
pub mod watchdog;
