//! Application service — the hexagonal core of the sequencer.
//!
//! [`AppService`] owns the FSM and its context.  It exposes a clean,
//! hardware-agnostic API.  All I/O flows through port traits injected at
//! call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!    ButtonPort ──▶ ┌─────────────────────────┐ ──▶ EventSink
//!                   │       AppService         │
//!  ActuatorPort ◀── │  FSM · request executor  │
//!     ClockPort ◀── └─────────────────────────┘
//! ```
//!
//! One [`step`](AppService::step) executes the hardware requests the
//! previous tick queued (blocking), then ticks the FSM once.

use log::{debug, info};

use crate::config::SystemConfig;
use crate::drivers::button::Gesture;
use crate::error::Result;
use crate::fsm::context::{BurstKind, FsmContext, HwRequest};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::profile::{ProfileId, StepCursor};

use super::events::AppEvent;
use super::ports::{ActuatorPort, ButtonPort, ClockPort, EventSink};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates the phase sequencer.
pub struct AppService {
    fsm: Fsm,
    ctx: FsmContext,
    /// Gesture applied by the most recent `ApplyGesture` entry.
    last_gesture: Option<Gesture>,
    step_count: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Rejects a configuration the timing code cannot execute.  Does
    /// **not** start the FSM: call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Result<Self> {
        config.validate()?;
        let ctx = FsmContext::new(config);
        let fsm = Fsm::new(build_state_table(), StateId::AwaitPress);
        Ok(Self {
            fsm,
            ctx,
            last_gesture: None,
            step_count: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the FSM in `AwaitPress` on the default profile, step 0.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started {
            state: self.fsm.current_state(),
            profile: self.ctx.active.id(),
        });
        info!(
            "AppService started in {:?} with profile {}",
            self.fsm.current_state(),
            self.ctx.active.id()
        );
    }

    // ── Per-step orchestration ────────────────────────────────

    /// Execute the pending hardware requests, then tick the FSM once.
    ///
    /// The `hw` parameter satisfies **all** hardware ports; this avoids
    /// multiple mutable borrows while keeping the port boundary explicit.
    /// On a hardware error the remaining requests are dropped and every
    /// actuator is switched off before the error is returned.
    pub fn step(
        &mut self,
        hw: &mut (impl ButtonPort + ActuatorPort + ClockPort),
        sink: &mut impl EventSink,
    ) -> Result<()> {
        self.step_count += 1;

        for req in self.ctx.take_requests() {
            if let Err(e) = self.execute(req, hw, sink) {
                log::error!("hardware request {:?} failed: {}", req, e);
                if let Err(off) = hw.all_off() {
                    log::error!("all_off after failure also failed: {}", off);
                }
                return Err(e);
            }
        }

        let prev_state = self.fsm.current_state();
        let prev_profile = self.ctx.active.id();
        let prev_cursor = self.ctx.cursor;

        self.fsm.tick(&mut self.ctx);

        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
            self.emit_transition_events(prev_state, new_state, prev_profile, prev_cursor, sink);
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn active_profile(&self) -> ProfileId {
        self.ctx.active.id()
    }

    pub fn cursor(&self) -> StepCursor {
        self.ctx.cursor
    }

    /// Service steps executed since startup.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// `true` when the next step would block on nothing but a button poll.
    pub fn is_idle(&self) -> bool {
        self.fsm.current_state() == StateId::AwaitPress
    }

    // ── Internal ──────────────────────────────────────────────

    /// Translate one FSM request into port calls.
    fn execute(
        &mut self,
        req: HwRequest,
        hw: &mut (impl ButtonPort + ActuatorPort + ClockPort),
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match req {
            HwRequest::Wait { ms } => hw.wait_ms(ms),
            HwRequest::SampleButton => {
                self.ctx.button_pressed = hw.is_pressed()?;
            }
            HwRequest::Burst { step, kind, burst } => {
                let report = hw.drive_motor(&burst)?;
                match kind {
                    BurstKind::Warmup => {
                        debug!("step {}: warm-up {} cycles", step.get(), report.cycles);
                    }
                    BurstKind::BuildUp { jitter_permille } => {
                        sink.emit(&AppEvent::BurstFired {
                            step: step.get(),
                            jitter_permille,
                            report,
                        });
                    }
                }
            }
            HwRequest::Solenoid { dwell_ms } => {
                hw.set_solenoid(true)?;
                hw.wait_ms(dwell_ms);
                hw.set_solenoid(false)?;
            }
        }
        Ok(())
    }

    fn emit_transition_events(
        &mut self,
        from: StateId,
        to: StateId,
        prev_profile: ProfileId,
        prev_cursor: StepCursor,
        sink: &mut impl EventSink,
    ) {
        match (from, to) {
            (_, StateId::ApplyGesture) => {
                self.last_gesture = self.ctx.gesture;
                if let Some(gesture) = self.ctx.gesture {
                    sink.emit(&AppEvent::GestureDetected(gesture));
                }
            }
            (StateId::ApplyGesture, StateId::AwaitPress) => {
                if self.last_gesture == Some(Gesture::LongPress) {
                    sink.emit(&AppEvent::ProfileChanged {
                        from: prev_profile,
                        to: self.ctx.active.id(),
                    });
                }
            }
            (_, StateId::RunStep) => {
                if let Some(plan) = self.ctx.plan {
                    sink.emit(&AppEvent::StepStarted {
                        profile: self.ctx.active.id(),
                        step: plan.step.get(),
                        sub_phase: plan.sub_phase,
                        build_up_ms: plan.build_up_ms,
                        duty: plan.duty,
                    });
                }
            }
            (_, StateId::AdvanceOrWrap) => {
                sink.emit(&AppEvent::StepCompleted {
                    profile: self.ctx.active.id(),
                    step: prev_cursor.get(),
                });
            }
            (StateId::AdvanceOrWrap, StateId::AwaitPress) => {
                if self.ctx.cycle_wrapped {
                    sink.emit(&AppEvent::CycleWrapped(self.ctx.active.id()));
                }
            }
            _ => {}
        }
    }
}
