//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the blackboard the state handlers read from and write
//! to: configuration, the active profile and step cursor, the latest
//! button sample, and the queue of hardware requests the handlers want
//! executed before the next tick.  Handlers never touch hardware.

use heapless::Vec;
use log::warn;

use crate::config::SystemConfig;
use crate::drivers::button::{Gesture, PressMeter};
use crate::drivers::pump::{BurstLength, MotorBurst};
use crate::drivers::soft_pwm::{percent_to_duty, Duty};
use crate::profile::{ActiveProfile, StepCursor, SubPhase};

/// Requests a handler can queue in one tick.
pub const MAX_REQUESTS: usize = 4;

// ---------------------------------------------------------------------------
// Hardware requests (written by state handlers; executed by the service)
// ---------------------------------------------------------------------------

/// Why a motor burst is fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstKind {
    /// Fixed low-duty pulse ahead of every build-up.
    Warmup,
    /// Build-up scaled by one jitter offset (per mille).
    BuildUp { jitter_permille: i16 },
}

/// One blocking hardware action, executed in queue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwRequest {
    /// Busy-wait.
    Wait { ms: u32 },
    /// Read the button into [`FsmContext::button_pressed`].
    SampleButton,
    /// PWM burst on the motor line.
    Burst {
        step: StepCursor,
        kind: BurstKind,
        burst: MotorBurst,
    },
    /// Energise the solenoid pair for `dwell_ms`, then release it.
    Solenoid { dwell_ms: u32 },
}

// ---------------------------------------------------------------------------
// Step plan
// ---------------------------------------------------------------------------

/// Nominal parameters of the step being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPlan {
    pub step: StepCursor,
    pub sub_phase: SubPhase,
    pub build_up_ms: u16,
    /// Duty on the 0–255 scale.
    pub duty: u8,
}

/// Build-up left after the warm-up, scaled by `1 + jitter/1000` and rounded.
pub fn adjusted_build_up_ms(build_up_ms: u16, warmup_ms: u32, jitter_permille: i16) -> u32 {
    let base = u32::from(build_up_ms).saturating_sub(warmup_ms);
    let factor = 1.0 + f32::from(jitter_permille) / 1000.0;
    (base as f32 * factor).round() as u32
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

pub struct FsmContext {
    // -- Configuration --
    pub config: SystemConfig,

    // -- Sequencer state --
    /// Profile whose tables the step loop reads.
    pub active: ActiveProfile,
    pub cursor: StepCursor,
    /// Set by `RunStep`, read by the jitter sweep.
    pub plan: Option<StepPlan>,
    /// Next jitter offset to run for the current step.
    pub jitter_index: usize,
    /// Set when the cursor wrapped back to step 0.
    pub cycle_wrapped: bool,

    // -- Operator input --
    /// Latest button sample.  Updated by the service on `SampleButton`.
    pub button_pressed: bool,
    pub meter: PressMeter,
    /// Classified gesture waiting to be applied.
    pub gesture: Option<Gesture>,
    /// Ignore the button until it has been released once.
    pub await_release: bool,

    // -- Hardware requests --
    pub requests: Vec<HwRequest, MAX_REQUESTS>,
}

impl FsmContext {
    /// Create a context on the configured default profile, step 0.
    pub fn new(config: SystemConfig) -> Self {
        let meter = PressMeter::new(config.long_press_polls);
        Self {
            active: ActiveProfile::new(config.default_profile),
            cursor: StepCursor::default(),
            plan: None,
            jitter_index: 0,
            cycle_wrapped: false,
            button_pressed: false,
            meter,
            gesture: None,
            await_release: false,
            requests: Vec::new(),
            config,
        }
    }

    /// Queue a hardware request for the service to execute.
    pub fn request(&mut self, req: HwRequest) {
        if self.requests.push(req).is_err() {
            debug_assert!(false, "hardware request queue overflow");
            warn!("FSM: request queue full, dropped {:?}", req);
        }
    }

    /// Hand the queued requests to the caller, leaving the queue empty.
    pub fn take_requests(&mut self) -> Vec<HwRequest, MAX_REQUESTS> {
        core::mem::take(&mut self.requests)
    }

    /// Queue one button poll after `interval_ms`.
    pub fn poll_button(&mut self, interval_ms: u32) {
        self.request(HwRequest::Wait { ms: interval_ms });
        self.request(HwRequest::SampleButton);
    }

    /// Nominal parameters for the step under the cursor.
    pub fn plan_step(&self) -> StepPlan {
        let step = self.cursor;
        StepPlan {
            step,
            sub_phase: step.sub_phase(),
            build_up_ms: self.active.build_up_ms(step),
            duty: percent_to_duty(self.active.duty_percent(step)),
        }
    }

    /// The fixed warm-up burst.
    pub fn warmup_burst(&self) -> MotorBurst {
        MotorBurst {
            length: BurstLength::Millis(self.config.warmup_ms),
            duty: Duty::Byte(self.config.warmup_duty),
            freq_khz: self.config.carrier_freq_khz,
        }
    }

    /// The build-up burst for `plan` perturbed by `jitter_permille`.
    pub fn build_up_burst(&self, plan: &StepPlan, jitter_permille: i16) -> MotorBurst {
        MotorBurst {
            length: BurstLength::Millis(adjusted_build_up_ms(
                plan.build_up_ms,
                self.config.warmup_ms,
                jitter_permille,
            )),
            duty: Duty::Byte(plan.duty),
            freq_khz: self.config.carrier_freq_khz,
        }
    }
}
