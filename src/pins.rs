//! GPIO / peripheral pin assignments for the PumpCycle controller board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Pump motor (software PWM line into the MOSFET gate driver)
// ---------------------------------------------------------------------------

pub const MOTOR_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Solenoid valve (H-bridge enable + drive, always switched as a pair)
// ---------------------------------------------------------------------------

pub const SOLENOID_ENABLE_GPIO: i32 = 5;
pub const SOLENOID_DRIVE_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Operator input
// ---------------------------------------------------------------------------

/// Momentary push-button, active HIGH with external pull-down.
pub const BUTTON_GPIO: i32 = 7;

// ---------------------------------------------------------------------------
// Status LED
// ---------------------------------------------------------------------------

pub const STATUS_LED_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// UART command link (pulse-train mode)
// ---------------------------------------------------------------------------

pub const UART_TX_GPIO: i32 = 17;
pub const UART_RX_GPIO: i32 = 18;
pub const UART_BAUD: u32 = 115_200;
