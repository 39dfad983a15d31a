//! Concrete state handler functions and table builder.
//!
//! Each state is three plain `fn` pointers; no closures, no dynamic
//! dispatch, no heap.  Handlers only mutate the context and queue
//! hardware requests; the service executes those (blocking) before the
//! next tick.
//!
//! ```text
//!        ┌──────────────[long press: toggle profile, cursor = 0]──────┐
//!        ▼                                                            │
//!  AWAIT_PRESS ──[pressed]──▶ MEASURE_PRESS ──[gesture]──▶ APPLY_GESTURE
//!        ▲                                                            │
//!        │                                                   [short press]
//!        │                                                            ▼
//!  ADVANCE_OR_WRAP ◀──[sweep done]── JITTER_SWEEP ◀────────────── RUN_STEP
//! ```

use log::{debug, info, warn};

use super::context::{BurstKind, FsmContext, HwRequest};
use super::{StateDescriptor, StateId};
use crate::drivers::button::Gesture;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: AwaitPress
        StateDescriptor {
            id: StateId::AwaitPress,
            name: "AwaitPress",
            on_enter: Some(await_press_enter),
            on_exit: None,
            on_update: await_press_update,
        },
        // Index 1: MeasurePress
        StateDescriptor {
            id: StateId::MeasurePress,
            name: "MeasurePress",
            on_enter: Some(measure_press_enter),
            on_exit: None,
            on_update: measure_press_update,
        },
        // Index 2: ApplyGesture
        StateDescriptor {
            id: StateId::ApplyGesture,
            name: "ApplyGesture",
            on_enter: None,
            on_exit: None,
            on_update: apply_gesture_update,
        },
        // Index 3: RunStep
        StateDescriptor {
            id: StateId::RunStep,
            name: "RunStep",
            on_enter: Some(run_step_enter),
            on_exit: None,
            on_update: run_step_update,
        },
        // Index 4: JitterSweep
        StateDescriptor {
            id: StateId::JitterSweep,
            name: "JitterSweep",
            on_enter: None,
            on_exit: Some(jitter_sweep_exit),
            on_update: jitter_sweep_update,
        },
        // Index 5: AdvanceOrWrap
        StateDescriptor {
            id: StateId::AdvanceOrWrap,
            name: "AdvanceOrWrap",
            on_enter: None,
            on_exit: None,
            on_update: advance_or_wrap_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  AWAIT_PRESS: poll the button at the fine interval
// ═══════════════════════════════════════════════════════════════════════════

fn await_press_enter(ctx: &mut FsmContext) {
    ctx.request(HwRequest::SampleButton);
}

fn await_press_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.await_release {
        if !ctx.button_pressed {
            ctx.await_release = false;
            debug!("AWAIT_PRESS: button released");
        }
    } else if ctx.button_pressed {
        return Some(StateId::MeasurePress);
    }

    ctx.poll_button(ctx.config.press_poll_interval_ms);
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  MEASURE_PRESS: count held polls at the coarse interval
// ═══════════════════════════════════════════════════════════════════════════

fn measure_press_enter(ctx: &mut FsmContext) {
    ctx.meter.reset();
    ctx.poll_button(ctx.config.long_press_poll_interval_ms);
}

fn measure_press_update(ctx: &mut FsmContext) -> Option<StateId> {
    match ctx.meter.sample(ctx.button_pressed) {
        Some(gesture) => {
            debug!(
                "MEASURE_PRESS: {:?} after {} held polls",
                gesture,
                ctx.meter.polls()
            );
            ctx.gesture = Some(gesture);
            Some(StateId::ApplyGesture)
        }
        None => {
            ctx.poll_button(ctx.config.long_press_poll_interval_ms);
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  APPLY_GESTURE: short runs the step, long switches profile
// ═══════════════════════════════════════════════════════════════════════════

fn apply_gesture_update(ctx: &mut FsmContext) -> Option<StateId> {
    match ctx.gesture.take() {
        Some(Gesture::ShortPress) => Some(StateId::RunStep),
        Some(Gesture::LongPress) => {
            let next = ctx.config.profile_set.next_after(ctx.active.id());
            let prev = ctx.active.switch_to(next);
            ctx.cursor.reset();
            // The button is still down; one hold is one toggle.
            ctx.await_release = true;
            info!("APPLY_GESTURE: profile {} -> {}, cycle restarted", prev, next);
            Some(StateId::AwaitPress)
        }
        None => {
            warn!("APPLY_GESTURE: entered without a gesture");
            Some(StateId::AwaitPress)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  RUN_STEP: fix the nominal parameters of the step
// ═══════════════════════════════════════════════════════════════════════════

fn run_step_enter(ctx: &mut FsmContext) {
    let plan = ctx.plan_step();
    info!(
        "RUN_STEP: {} step {} ({}) build-up {} ms, duty {}/255",
        ctx.active.id(),
        plan.step.get(),
        plan.sub_phase,
        plan.build_up_ms,
        plan.duty
    );
    ctx.plan = Some(plan);
    ctx.jitter_index = 0;
}

fn run_step_update(_ctx: &mut FsmContext) -> Option<StateId> {
    Some(StateId::JitterSweep)
}

// ═══════════════════════════════════════════════════════════════════════════
//  JITTER_SWEEP: one warm-up + build-up + solenoid dwell per offset
// ═══════════════════════════════════════════════════════════════════════════

fn jitter_sweep_update(ctx: &mut FsmContext) -> Option<StateId> {
    let Some(plan) = ctx.plan else {
        warn!("JITTER_SWEEP: no step plan");
        return Some(StateId::AdvanceOrWrap);
    };
    let Some(&jitter) = ctx.config.jitter_offsets.get(ctx.jitter_index) else {
        return Some(StateId::AdvanceOrWrap);
    };

    let warmup = ctx.warmup_burst();
    let build_up = ctx.build_up_burst(&plan, jitter);
    ctx.request(HwRequest::Burst {
        step: plan.step,
        kind: BurstKind::Warmup,
        burst: warmup,
    });
    ctx.request(HwRequest::Burst {
        step: plan.step,
        kind: BurstKind::BuildUp {
            jitter_permille: jitter,
        },
        burst: build_up,
    });
    ctx.request(HwRequest::Solenoid {
        dwell_ms: ctx.config.burst_dwell_ms,
    });
    ctx.jitter_index += 1;
    None
}

fn jitter_sweep_exit(ctx: &mut FsmContext) {
    ctx.plan = None;
}

// ═══════════════════════════════════════════════════════════════════════════
//  ADVANCE_OR_WRAP
// ═══════════════════════════════════════════════════════════════════════════

fn advance_or_wrap_update(ctx: &mut FsmContext) -> Option<StateId> {
    ctx.cycle_wrapped = ctx.cursor.advance();
    if ctx.cycle_wrapped {
        info!("ADVANCE: {} cycle complete, back to step 0", ctx.active.id());
    }
    Some(StateId::AwaitPress)
}
