//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the motor, solenoid and button drivers plus the busy-wait clock,
//! exposing them through [`ButtonPort`], [`ActuatorPort`] and
//! [`ClockPort`].  It is generic over embedded-hal pins, so the same code
//! runs on `PinDriver`s on target and on recording mocks in tests.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::{ActuatorPort, ButtonPort, ClockPort};
use crate::drivers::button::Button;
use crate::drivers::pump::{MotorBurst, PumpMotor};
use crate::drivers::soft_pwm::{PwmReport, WaveformClock};
use crate::drivers::solenoid::SolenoidValve;
use crate::error::Result;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<M, EN, DRV, B, C> {
    motor: PumpMotor<M>,
    solenoid: SolenoidValve<EN, DRV>,
    button: Button<B>,
    clock: C,
}

impl<M, EN, DRV, B, C> HardwareAdapter<M, EN, DRV, B, C>
where
    M: OutputPin,
    EN: OutputPin,
    DRV: OutputPin,
    B: InputPin,
    C: WaveformClock,
{
    pub fn new(
        motor: PumpMotor<M>,
        solenoid: SolenoidValve<EN, DRV>,
        button: Button<B>,
        clock: C,
    ) -> Self {
        Self {
            motor,
            solenoid,
            button,
            clock,
        }
    }

    pub fn motor(&self) -> &PumpMotor<M> {
        &self.motor
    }

    pub fn solenoid(&self) -> &SolenoidValve<EN, DRV> {
        &self.solenoid
    }
}

// ── ButtonPort implementation ─────────────────────────────────

impl<M, EN, DRV, B, C> ButtonPort for HardwareAdapter<M, EN, DRV, B, C>
where
    B: InputPin,
{
    fn is_pressed(&mut self) -> Result<bool> {
        self.button.is_pressed()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<M, EN, DRV, B, C> ActuatorPort for HardwareAdapter<M, EN, DRV, B, C>
where
    M: OutputPin,
    EN: OutputPin,
    DRV: OutputPin,
    C: WaveformClock,
{
    fn drive_motor(&mut self, burst: &MotorBurst) -> Result<PwmReport> {
        self.motor.run(&mut self.clock, burst)
    }

    fn set_solenoid(&mut self, energised: bool) -> Result<()> {
        self.solenoid.set(energised)
    }

    fn all_off(&mut self) -> Result<()> {
        // Try both even if the first fails.
        let motor = self.motor.stop();
        let solenoid = self.solenoid.release();
        motor.and(solenoid)
    }
}

// ── ClockPort implementation ──────────────────────────────────

impl<M, EN, DRV, B, C> ClockPort for HardwareAdapter<M, EN, DRV, B, C>
where
    C: WaveformClock,
{
    fn wait_ms(&mut self, ms: u32) {
        self.clock.busy_wait_ms(ms);
    }
}
