//! Pump motor line driver.
//!
//! The motor is switched by a single digital line; speed comes from the
//! software PWM engine in [`soft_pwm`](super::soft_pwm).  The driver is a
//! dumb actuator: it runs whatever burst it is handed and keeps a little
//! bookkeeping for diagnostics.
//!
//! The line is low whenever no burst is running.

use embedded_hal::digital::OutputPin;

use super::soft_pwm::{self, motor_fault, Duty, PwmReport, PwmTiming, WaveformClock};
use crate::error::Result;

/// How long a burst lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstLength {
    /// Whole carrier periods fitting in this many milliseconds.
    Millis(u32),
    /// Exactly this many carrier periods.
    Pulses(u32),
}

/// One blocking PWM burst on the motor line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorBurst {
    pub length: BurstLength,
    pub duty: Duty,
    pub freq_khz: u16,
}

impl MotorBurst {
    pub fn timing(&self) -> Result<PwmTiming> {
        match self.length {
            BurstLength::Millis(ms) => {
                PwmTiming::scaled_for_duration(ms, self.duty, self.freq_khz)
            }
            BurstLength::Pulses(n) => PwmTiming::scaled_for_pulses(n, self.duty, self.freq_khz),
        }
    }
}

pub struct PumpMotor<P> {
    pin: P,
    bursts: u32,
    last: Option<PwmReport>,
}

impl<P: OutputPin> PumpMotor<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            bursts: 0,
            last: None,
        }
    }

    /// Run `burst` to completion.  Blocks for the whole waveform.
    pub fn run(&mut self, clock: &mut impl WaveformClock, burst: &MotorBurst) -> Result<PwmReport> {
        let timing = burst.timing()?;
        let report = soft_pwm::drive(&mut self.pin, clock, &timing)?;
        self.bursts = self.bursts.wrapping_add(1);
        self.last = Some(report);
        Ok(report)
    }

    pub fn stop(&mut self) -> Result<()> {
        self.pin.set_low().map_err(motor_fault)
    }

    /// Bursts completed since power-on (wraps).
    pub fn burst_count(&self) -> u32 {
        self.bursts
    }

    pub fn last_report(&self) -> Option<PwmReport> {
        self.last
    }
}
