//! Software PWM engine.
//!
//! Synthesises a duty-cycled square wave on one output line purely from
//! busy-wait timing; no PWM peripheral is involved.  Every call blocks
//! the caller for the whole waveform.
//!
//! ## Timing arithmetic
//!
//! All arithmetic is integer and truncating, and the truncation is part
//! of the contract (downstream mechanical calibration depends on it):
//!
//! ```text
//! period_us = 1000 / freq_khz
//! on_us     = period_us * duty / 255      (Duty::Byte)
//! on_us     = period_us * percent / 100   (Duty::Percent)
//! off_us    = period_us - on_us
//! cycles    = duration_ms * 1000 / period_us
//! ```
//!
//! The sequencer tables are calibrated on the byte scale; the serial
//! pulse train is calibrated directly in percent.
//!
//! Frequencies that do not divide 1000 run slightly fast, and the
//! waveform can under-run the requested duration by up to one period.
//!
//! ## Line discipline
//!
//! A zero-length half-period is skipped entirely, so duty 0 never drives
//! the line high and duty 255 never drives it low inside the waveform.
//! The line is parked low once the last cycle finishes.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::error::{ActuatorError, ConfigError, Error, Result};

/// Highest usable carrier; above this the period truncates to 0 µs.
pub const MAX_FREQ_KHZ: u16 = 1000;

/// Microsecond-resolution blocking sleep.
///
/// Implemented for every embedded-hal [`DelayNs`], so a busy-wait delay
/// such as the ESP-IDF `Ets` delay plugs straight in.
pub trait WaveformClock {
    fn busy_wait_us(&mut self, us: u32);
    fn busy_wait_ms(&mut self, ms: u32);
}

impl<D: DelayNs> WaveformClock for D {
    fn busy_wait_us(&mut self, us: u32) {
        self.delay_us(us);
    }

    fn busy_wait_ms(&mut self, ms: u32) {
        self.delay_ms(ms);
    }
}

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Duty ratio of a waveform, on the scale its caller is calibrated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duty {
    /// 0–255, where 255 is always on.
    Byte(u8),
    /// 0–100 %, clamped at 100.
    Percent(u8),
}

impl Duty {
    fn on_us(self, period_us: u32) -> u32 {
        match self {
            Self::Byte(d) => period_us * u32::from(d) / 255,
            Self::Percent(p) => period_us * u32::from(p.min(100)) / 100,
        }
    }
}

/// Integer timing of one waveform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmTiming {
    pub period_us: u32,
    pub on_us: u32,
    pub off_us: u32,
    pub cycles: u32,
}

impl PwmTiming {
    /// Timing for a waveform of `duration_ms` at `duty` (0–255).
    pub fn for_duration(duration_ms: u32, duty: u8, freq_khz: u16) -> Result<Self> {
        Self::scaled_for_duration(duration_ms, Duty::Byte(duty), freq_khz)
    }

    /// Timing for exactly `pulses` cycles at `duty` (0–255).
    pub fn for_pulses(pulses: u32, duty: u8, freq_khz: u16) -> Result<Self> {
        Self::scaled_for_pulses(pulses, Duty::Byte(duty), freq_khz)
    }

    /// Timing for exactly `pulses` cycles at `percent` (0–100).
    pub fn for_pulses_percent(pulses: u32, percent: u8, freq_khz: u16) -> Result<Self> {
        Self::scaled_for_pulses(pulses, Duty::Percent(percent), freq_khz)
    }

    /// Whole carrier periods fitting in `duration_ms`.
    ///
    /// Rejects durations whose cycle count does not fit in `u32`.
    pub fn scaled_for_duration(duration_ms: u32, duty: Duty, freq_khz: u16) -> Result<Self> {
        let period_us = period_us(freq_khz)?;
        let cycles = u64::from(duration_ms) * 1000 / u64::from(period_us);
        let cycles =
            u32::try_from(cycles).map_err(|_| ConfigError::BurstTooLong(duration_ms))?;
        Ok(Self::with_cycles(period_us, duty, cycles))
    }

    pub fn scaled_for_pulses(pulses: u32, duty: Duty, freq_khz: u16) -> Result<Self> {
        let period_us = period_us(freq_khz)?;
        Ok(Self::with_cycles(period_us, duty, pulses))
    }

    fn with_cycles(period_us: u32, duty: Duty, cycles: u32) -> Self {
        let on_us = duty.on_us(period_us);
        Self {
            period_us,
            on_us,
            off_us: period_us - on_us,
            cycles,
        }
    }

    /// Busy-wait time the waveform actually occupies.
    pub fn elapsed_us(&self) -> u64 {
        u64::from(self.cycles) * u64::from(self.period_us)
    }
}

/// Reject carriers whose period would truncate to zero.
pub fn check_carrier(freq_khz: u16) -> core::result::Result<(), ConfigError> {
    if freq_khz == 0 || freq_khz > MAX_FREQ_KHZ {
        return Err(ConfigError::CarrierOutOfRange(freq_khz));
    }
    Ok(())
}

fn period_us(freq_khz: u16) -> Result<u32> {
    check_carrier(freq_khz)?;
    Ok(1000 / u32::from(freq_khz))
}

/// Convert a 0–100 % duty to the engine's 0–255 scale (truncating).
pub fn percent_to_duty(percent: u8) -> u8 {
    (u16::from(percent.min(100)) * 255 / 100) as u8
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Completion signal of one waveform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PwmReport {
    pub cycles: u32,
    /// High writes made inside the waveform.
    pub high_writes: u32,
    /// Low writes made inside the waveform (excludes the final park).
    pub low_writes: u32,
    pub elapsed_us: u64,
}

/// Drive `pin` through the waveform described by `timing`, then park it low.
pub fn drive<P, C>(pin: &mut P, clock: &mut C, timing: &PwmTiming) -> Result<PwmReport>
where
    P: OutputPin,
    C: WaveformClock + ?Sized,
{
    let mut report = PwmReport {
        cycles: timing.cycles,
        elapsed_us: timing.elapsed_us(),
        ..PwmReport::default()
    };

    for _ in 0..timing.cycles {
        if timing.on_us > 0 {
            pin.set_high().map_err(motor_fault)?;
            report.high_writes += 1;
            clock.busy_wait_us(timing.on_us);
        }
        if timing.off_us > 0 {
            pin.set_low().map_err(motor_fault)?;
            report.low_writes += 1;
            clock.busy_wait_us(timing.off_us);
        }
    }

    pin.set_low().map_err(motor_fault)?;
    Ok(report)
}

/// Generate a waveform of `duration_ms` at `duty` (0–255) and `freq_khz`.
///
/// Blocks for `cycles * period_us` microseconds.
pub fn generate<P, C>(
    pin: &mut P,
    clock: &mut C,
    duration_ms: u32,
    duty: u8,
    freq_khz: u16,
) -> Result<PwmReport>
where
    P: OutputPin,
    C: WaveformClock + ?Sized,
{
    let timing = PwmTiming::for_duration(duration_ms, duty, freq_khz)?;
    drive(pin, clock, &timing)
}

pub(crate) fn motor_fault<E: core::fmt::Debug>(e: E) -> Error {
    log::error!("motor line write failed: {:?}", e);
    ActuatorError::MotorWriteFailed.into()
}
