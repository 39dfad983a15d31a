//! Actuation profiles.
//!
//! A profile is a pair of index-aligned, fixed-length tables: the nominal
//! build-up time (ms) and the nominal motor duty (0–100 %) for each of the
//! [`STEP_COUNT`] steps of one pumping cycle.  Steps `0..=8` form the
//! stimulation sub-phase, steps `9..=17` the expression sub-phase.
//!
//! The tables are externally calibrated constants.  Nothing here derives
//! them; they are only looked up.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Number of steps in every profile.
pub const STEP_COUNT: usize = 18;

/// First step of the expression sub-phase.
const EXPRESSION_START: u8 = 9;

// ---------------------------------------------------------------------------
// Profile identity
// ---------------------------------------------------------------------------

/// Named actuation profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProfileId {
    Swing,
    Solo,
}

impl ProfileId {
    /// The other profile (`swing <-> solo`).
    pub const fn toggled(self) -> Self {
        match self {
            Self::Swing => Self::Solo,
            Self::Solo => Self::Swing,
        }
    }

    /// Calibrated tables for this profile.
    pub const fn profile(self) -> &'static Profile {
        match self {
            Self::Swing => &SWING,
            Self::Solo => &SOLO,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Swing => "swing",
            Self::Solo => "solo",
        }
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Profile tables
// ---------------------------------------------------------------------------

/// One profile's calibrated tables.
#[derive(Debug, PartialEq, Eq)]
pub struct Profile {
    pub id: ProfileId,
    /// Nominal build-up duration per step (ms).
    pub build_up_ms: [u16; STEP_COUNT],
    /// Nominal motor duty per step (0–100 %).
    pub duty_percent: [u8; STEP_COUNT],
}

impl Profile {
    /// Reject tables with a duty above 100 %.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.duty_percent.iter().position(|&d| d > 100) {
            Some(step) => Err(ConfigError::DutyOutOfRange {
                profile: self.id,
                step: step as u8,
            }),
            None => Ok(()),
        }
    }
}

pub static SWING: Profile = Profile {
    id: ProfileId::Swing,
    build_up_ms: [
        200, 190, 180, 170, 160, 150, 140, 130, 120, // stimulation
        420, 440, 460, 480, 500, 520, 540, 560, 580, // expression
    ],
    duty_percent: [
        40, 42, 44, 46, 48, 50, 52, 54, 56, //
        60, 62, 64, 66, 68, 70, 72, 74, 76,
    ],
};

pub static SOLO: Profile = Profile {
    id: ProfileId::Solo,
    build_up_ms: [
        180, 170, 160, 150, 140, 130, 120, 110, 100, // stimulation
        400, 420, 440, 460, 480, 500, 520, 540, 560, // expression
    ],
    duty_percent: [
        35, 37, 39, 41, 43, 45, 47, 49, 51, //
        55, 58, 61, 64, 67, 70, 73, 76, 79,
    ],
};

// ---------------------------------------------------------------------------
// Profile sets (firmware variants)
// ---------------------------------------------------------------------------

/// Which profiles the firmware offers, fixed at initialisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileSet {
    /// Solo only; a long-press restarts the cycle without switching.
    SoloOnly,
    /// Swing and solo, toggled by long-press.
    SwingAndSolo,
}

impl ProfileSet {
    pub fn contains(self, id: ProfileId) -> bool {
        match self {
            Self::SoloOnly => id == ProfileId::Solo,
            Self::SwingAndSolo => true,
        }
    }

    /// Profile selected by a long-press while `current` is active.
    pub fn next_after(self, current: ProfileId) -> ProfileId {
        let next = current.toggled();
        if self.contains(next) { next } else { current }
    }

    pub fn members(self) -> &'static [ProfileId] {
        match self {
            Self::SoloOnly => &[ProfileId::Solo],
            Self::SwingAndSolo => &[ProfileId::Swing, ProfileId::Solo],
        }
    }
}

// ---------------------------------------------------------------------------
// Active selection
// ---------------------------------------------------------------------------

/// The profile the step loop currently reads.
///
/// Both tables are always borrowed from the same [`Profile`]; there is no
/// way to construct a mixed selection.
#[derive(Debug, Clone, Copy)]
pub struct ActiveProfile {
    profile: &'static Profile,
}

impl ActiveProfile {
    pub fn new(id: ProfileId) -> Self {
        Self {
            profile: id.profile(),
        }
    }

    pub fn id(&self) -> ProfileId {
        self.profile.id
    }

    pub fn build_up_ms(&self, step: StepCursor) -> u16 {
        self.profile.build_up_ms[step.index()]
    }

    pub fn duty_percent(&self, step: StepCursor) -> u8 {
        self.profile.duty_percent[step.index()]
    }

    /// Switch to `id`, returning the previous profile.
    pub fn switch_to(&mut self, id: ProfileId) -> ProfileId {
        let prev = self.id();
        self.profile = id.profile();
        prev
    }
}

// ---------------------------------------------------------------------------
// Step cursor
// ---------------------------------------------------------------------------

/// Position in the active profile, always in `0..STEP_COUNT`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct StepCursor(u8);

impl StepCursor {
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Move to the next step.  Returns `true` when the cursor wrapped to 0.
    pub fn advance(&mut self) -> bool {
        self.0 += 1;
        if self.index() >= STEP_COUNT {
            self.0 = 0;
            return true;
        }
        false
    }

    pub fn sub_phase(self) -> SubPhase {
        SubPhase::of(self)
    }
}

/// Fixed partition of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubPhase {
    Stimulation,
    Expression,
}

impl SubPhase {
    pub fn of(step: StepCursor) -> Self {
        if step.get() < EXPRESSION_START {
            Self::Stimulation
        } else {
            Self::Expression
        }
    }
}

impl fmt::Display for SubPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stimulation => f.write_str("stimulation"),
            Self::Expression => f.write_str("expression"),
        }
    }
}
