//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService / PulseMode (domain)
//! ```
//!
//! Driven adapters (button, actuators, clock, serial link, event sinks)
//! implement these traits.  The domain consumes them via generics, so it
//! never touches a GPIO or the UART directly.
//!
//! Every port call blocks until the hardware action has finished; the
//! firmware is single-threaded and there is nothing else to schedule.

use crate::drivers::pump::MotorBurst;
use crate::drivers::soft_pwm::PwmReport;
use crate::error::Result;

// ───────────────────────────────────────────────────────────────
// Button port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the operator push-button.
pub trait ButtonPort {
    /// Sample the button once.  `true` = pressed.
    fn is_pressed(&mut self) -> Result<bool>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
pub trait ActuatorPort {
    /// Run one PWM burst on the motor line.  Returns once the line is
    /// parked low again.
    fn drive_motor(&mut self, burst: &MotorBurst) -> Result<PwmReport>;

    /// Energise (`true`) or release the solenoid pair.
    fn set_solenoid(&mut self, energised: bool) -> Result<()>;

    /// Drop every actuator line: safe shutdown.
    fn all_off(&mut self) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Blocking millisecond delays between hardware actions.
pub trait ClockPort {
    fn wait_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Serial port (driven adapter: host link)
// ───────────────────────────────────────────────────────────────

/// Byte-level access to the command UART.
pub trait SerialPort {
    /// Non-blocking read of one byte.
    fn read_byte(&mut self) -> Result<Option<u8>>;

    /// Write all of `bytes`.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
