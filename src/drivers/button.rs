//! Polled push-button driver with short/long press classification.
//!
//! ## Hardware
//!
//! Active-high momentary switch with pull-down.  There is no interrupt
//! and no debounce filter: the line is only sampled at the poll points
//! chosen by the sequencer, and the poll cadence is the only debounce.
//!
//! ## Gesture detection
//!
//! | Gesture     | Condition                                     |
//! |-------------|-----------------------------------------------|
//! | Short press | Released while held polls <= threshold        |
//! | Long press  | Held polls > threshold (strict; ties → short) |
//!
//! One held poll is one `long_press_poll_interval_ms` sample that still
//! reads pressed.  With the default 10-poll threshold at 100 ms a press
//! becomes long on the 11th held sample, about 1.1 s after it began.

use embedded_hal::digital::InputPin;

use crate::error::{InputError, Result};

/// Classified button interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    ShortPress,
    LongPress,
}

/// Held-poll counter for one press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressMeter {
    polls: u32,
    threshold: u32,
}

impl PressMeter {
    pub fn new(threshold: u32) -> Self {
        Self {
            polls: 0,
            threshold,
        }
    }

    /// Start measuring a new press.
    pub fn reset(&mut self) {
        self.polls = 0;
    }

    /// Feed one poll sample.  Returns the gesture once it is decided.
    pub fn sample(&mut self, pressed: bool) -> Option<Gesture> {
        if !pressed {
            return Some(Gesture::ShortPress);
        }
        self.polls = self.polls.saturating_add(1);
        if self.polls > self.threshold {
            return Some(Gesture::LongPress);
        }
        None
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }
}

pub struct Button<I> {
    pin: I,
}

impl<I: InputPin> Button<I> {
    pub fn new(pin: I) -> Self {
        Self { pin }
    }

    pub fn is_pressed(&mut self) -> Result<bool> {
        self.pin.is_high().map_err(|e| {
            log::error!("button read failed: {:?}", e);
            InputError::ButtonReadFailed.into()
        })
    }
}
