//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) and
//! [`PulseMode`](super::pulse_mode::PulseMode) emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (the firmware logs them).

use crate::drivers::button::Gesture;
use crate::drivers::soft_pwm::PwmReport;
use crate::fsm::StateId;
use crate::profile::{ProfileId, SubPhase};
use crate::protocol::PulseCommand;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The sequencer has started (carries initial state and profile).
    Started { state: StateId, profile: ProfileId },

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// A press was classified.
    GestureDetected(Gesture),

    /// A long-press switched the active profile (or restarted it).
    ProfileChanged { from: ProfileId, to: ProfileId },

    /// A short-press started running a step.
    StepStarted {
        profile: ProfileId,
        step: u8,
        sub_phase: SubPhase,
        build_up_ms: u16,
        duty: u8,
    },

    /// One jittered build-up burst finished.
    BurstFired {
        step: u8,
        jitter_permille: i16,
        report: PwmReport,
    },

    /// Every jitter offset of a step has run.
    StepCompleted { profile: ProfileId, step: u8 },

    /// The cursor wrapped back to step 0.
    CycleWrapped(ProfileId),

    /// The serial handshake produced a command.
    PulseCommandReceived(PulseCommand),

    /// The pulse train and its solenoid sequence finished.
    PulseTrainDone(PwmReport),
}
