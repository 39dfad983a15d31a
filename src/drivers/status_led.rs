//! Single-colour status LED.
//!
//! Used as the halt heartbeat once a serial pulse train has finished.

use embedded_hal::digital::OutputPin;

use crate::error::{ActuatorError, Error, Result};

pub struct StatusLed<P> {
    pin: P,
    lit: bool,
}

impl<P: OutputPin> StatusLed<P> {
    pub fn new(pin: P) -> Self {
        Self { pin, lit: false }
    }

    pub fn set(&mut self, lit: bool) -> Result<()> {
        if lit {
            self.pin.set_high().map_err(led_fault)?;
        } else {
            self.pin.set_low().map_err(led_fault)?;
        }
        self.lit = lit;
        Ok(())
    }

    pub fn toggle(&mut self) -> Result<()> {
        self.set(!self.lit)
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

fn led_fault<E: core::fmt::Debug>(e: E) -> Error {
    log::warn!("status LED write failed: {:?}", e);
    ActuatorError::LedWriteFailed.into()
}
