//! Function-pointer finite state machine engine.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StateTable                                                  │
//! │  ┌───────────────┬───────────┬──────────┬───────────────────┐ │
//! │  │ StateId       │ on_enter  │ on_exit  │ on_update         │ │
//! │  ├───────────────┼───────────┼──────────┼───────────────────┤ │
//! │  │ AwaitPress    │ fn(ctx)   │ —        │ fn(ctx)->Option<> │ │
//! │  │ MeasurePress  │ fn(ctx)   │ —        │ fn(ctx)->Option<> │ │
//! │  │ ApplyGesture  │ —         │ —        │ fn(ctx)->Option<> │ │
//! │  │ RunStep       │ fn(ctx)   │ —        │ fn(ctx)->Option<> │ │
//! │  │ JitterSweep   │ —         │ fn(ctx)  │ fn(ctx)->Option<> │ │
//! │  │ AdvanceOrWrap │ —         │ —        │ fn(ctx)->Option<> │ │
//! │  └───────────────┴───────────┴──────────┴───────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next_id)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next, and updates the
//! current pointer.  All functions receive `&mut FsmContext`.
//!
//! A tick never blocks: handlers queue [`context::HwRequest`]s and the
//! caller executes them between ticks.

pub mod context;
pub mod states;

use context::FsmContext;
use log::debug;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all sequencer states.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    AwaitPress = 0,
    MeasurePress = 1,
    ApplyGesture = 2,
    RunStep = 3,
    JitterSweep = 4,
    AdvanceOrWrap = 5,
}

impl StateId {
    /// Total number of states: used to size the table array.
    pub const COUNT: usize = 6;

    /// Convert a table index back to `StateId`.  Asserts in debug builds;
    /// falls back to `AwaitPress` (actuators idle) in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::AwaitPress,
            1 => Self::MeasurePress,
            2 => Self::ApplyGesture,
            3 => Self::RunStep,
            4 => Self::JitterSweep,
            5 => Self::AdvanceOrWrap,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::AwaitPress
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    current: usize,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        debug_assert!(
            table.iter().enumerate().all(|(i, s)| s.id as usize == i),
            "state table out of order"
        );
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        debug!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one tick.
    pub fn tick(&mut self, ctx: &mut FsmContext) {
        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut FsmContext) {
        let next_idx = next_id as usize;

        debug!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
