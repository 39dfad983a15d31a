//! Unified error types for the PumpCycle firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! top-level control loop's error handling uniform.  All variants are
//! `Copy` so they pass through the sequencer and port boundary without
//! allocation.

use core::fmt;

use crate::profile::ProfileId;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration rejected at initialisation.
    Config(ConfigError),
    /// An actuator line could not be driven.
    Actuator(ActuatorError),
    /// The operator input could not be read.
    Input(InputError),
    /// The serial command link failed.
    Serial(SerialError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Input(e) => write!(f, "input: {e}"),
            Self::Serial(e) => write!(f, "serial: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Carrier frequency outside `1..=1000` kHz (period would truncate to 0).
    CarrierOutOfRange(u16),
    /// The jitter sweep has no offsets.
    JitterSweepEmpty,
    /// A jitter offset would make the build-up scale factor non-positive.
    JitterOffsetOutOfRange(i16),
    /// Jitter offsets must be strictly ascending.
    JitterSweepUnordered,
    /// A poll interval is zero.
    ZeroPollInterval,
    /// The long-press threshold is zero.
    ZeroLongPressThreshold,
    /// A profile table entry exceeds 100 % duty.
    DutyOutOfRange { profile: ProfileId, step: u8 },
    /// The default profile is not part of the configured profile set.
    ProfileUnavailable(ProfileId),
    /// A burst this long (ms) has more carrier cycles than fit in `u32`.
    BurstTooLong(u32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CarrierOutOfRange(khz) => {
                write!(f, "carrier frequency {khz} kHz outside 1..=1000")
            }
            Self::JitterSweepEmpty => write!(f, "jitter sweep is empty"),
            Self::JitterOffsetOutOfRange(j) => {
                write!(f, "jitter offset {j} outside -999..=999")
            }
            Self::JitterSweepUnordered => write!(f, "jitter offsets not strictly ascending"),
            Self::ZeroPollInterval => write!(f, "poll interval is zero"),
            Self::ZeroLongPressThreshold => write!(f, "long-press threshold is zero"),
            Self::DutyOutOfRange { profile, step } => {
                write!(f, "{profile} step {step}: duty above 100%")
            }
            Self::ProfileUnavailable(id) => write!(f, "profile {id} not in profile set"),
            Self::BurstTooLong(ms) => write!(f, "{ms} ms burst exceeds the cycle counter"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// Motor PWM line write failed.
    MotorWriteFailed,
    /// Solenoid enable or drive line write failed.
    SolenoidWriteFailed,
    /// Status LED write failed.
    LedWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MotorWriteFailed => write!(f, "motor line write failed"),
            Self::SolenoidWriteFailed => write!(f, "solenoid line write failed"),
            Self::LedWriteFailed => write!(f, "status LED write failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Input errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    /// Button GPIO read failed.
    ButtonReadFailed,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ButtonReadFailed => write!(f, "button read failed"),
        }
    }
}

impl From<InputError> for Error {
    fn from(e: InputError) -> Self {
        Self::Input(e)
    }
}

// ---------------------------------------------------------------------------
// Serial errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialError {
    ReadFailed,
    WriteFailed,
}

impl fmt::Display for SerialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed => write!(f, "UART read failed"),
            Self::WriteFailed => write!(f, "UART write failed"),
        }
    }
}

impl From<SerialError> for Error {
    fn from(e: SerialError) -> Self {
        Self::Serial(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
