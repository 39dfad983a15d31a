//! System configuration parameters
//!
//! All tunable parameters for the PumpCycle firmware, gathered in one
//! place.  Values are compile-time defaults; nothing is persisted across
//! power cycles.  [`SystemConfig::validate`] runs once at start-up and
//! rejects anything the timing code cannot execute.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::drivers::soft_pwm::check_carrier;
use crate::error::ConfigError;
use crate::profile::{ProfileId, ProfileSet};

/// Maximum number of jitter offsets in one sweep.
pub const MAX_JITTER_OFFSETS: usize = 16;

/// Which front-end drives the pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    /// Button-gated phase sequencer over the profile tables.
    Sequencer,
    /// Serial handshake followed by a single pulse train.
    PulseTrain,
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    pub run_mode: RunMode,

    // --- Profiles ---
    /// Profiles available to the long-press toggle.
    pub profile_set: ProfileSet,
    /// Profile active after boot.
    pub default_profile: ProfileId,

    // --- Motor PWM ---
    /// Software PWM carrier frequency (kHz, 1–1000).
    pub carrier_freq_khz: u16,
    /// Fixed warm-up pulse before every build-up burst (ms).
    pub warmup_ms: u32,
    /// Warm-up duty on the 0–255 scale.
    pub warmup_duty: u8,

    // --- Jitter sweep ---
    /// Per-mille perturbations applied to each build-up, ascending.
    pub jitter_offsets: Vec<i16, MAX_JITTER_OFFSETS>,

    // --- Solenoid ---
    /// Time the solenoid pair is held energised after each burst (ms).
    pub burst_dwell_ms: u32,

    // --- Button ---
    /// Poll interval while waiting for a press (ms).
    pub press_poll_interval_ms: u32,
    /// Poll interval while measuring a held press (ms).
    pub long_press_poll_interval_ms: u32,
    /// A press is long once the held-poll counter exceeds this.
    pub long_press_polls: u32,

    // --- Serial pulse-train mode ---
    /// Pulse-train carrier frequency (kHz, 1–1000).
    pub pulse_freq_khz: u16,
    /// Solenoid-low settle time before a pulse train (ms).
    pub pulse_settle_ms: u32,
    /// Solenoid high and low hold times after a pulse train (ms).
    pub pulse_dwell_ms: u32,
    /// Pause after every handshake byte (ms).
    pub serial_byte_gap_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut jitter_offsets = Vec::new();
        for offset in [-120, -80, -40, 0, 40, 80, 120] {
            // Capacity is 16; seven offsets always fit.
            let _ = jitter_offsets.push(offset);
        }

        Self {
            run_mode: RunMode::Sequencer,

            profile_set: ProfileSet::SwingAndSolo,
            default_profile: ProfileId::Swing,

            carrier_freq_khz: 20,
            warmup_ms: 35,
            warmup_duty: 95, // 1.5/4 of full scale

            jitter_offsets,

            burst_dwell_ms: 200,

            press_poll_interval_ms: 10,
            long_press_poll_interval_ms: 100,
            long_press_polls: 10, // ~1 s held

            pulse_freq_khz: 20,
            pulse_settle_ms: 10,
            pulse_dwell_ms: 800,
            serial_byte_gap_ms: 10,
        }
    }
}

impl SystemConfig {
    /// Check every field the timing code divides by or indexes with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_carrier(self.carrier_freq_khz)?;
        check_carrier(self.pulse_freq_khz)?;

        if self.jitter_offsets.is_empty() {
            return Err(ConfigError::JitterSweepEmpty);
        }
        if let Some(&bad) = self.jitter_offsets.iter().find(|j| j.unsigned_abs() >= 1000) {
            return Err(ConfigError::JitterOffsetOutOfRange(bad));
        }
        if self.jitter_offsets.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::JitterSweepUnordered);
        }

        if self.press_poll_interval_ms == 0 || self.long_press_poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.long_press_polls == 0 {
            return Err(ConfigError::ZeroLongPressThreshold);
        }

        if !self.profile_set.contains(self.default_profile) {
            return Err(ConfigError::ProfileUnavailable(self.default_profile));
        }
        for id in self.profile_set.members() {
            id.profile().validate()?;
        }

        Ok(())
    }
}
