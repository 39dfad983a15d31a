//! Solenoid valve driver.
//!
//! Two digital outputs, enable and drive, always switched as a pair.
//! Energising raises enable before drive; releasing drops drive before
//! enable, so the coil is never driven while its enable is low.

use embedded_hal::digital::OutputPin;

use crate::error::{ActuatorError, Error, Result};

pub struct SolenoidValve<EN, DRV> {
    enable: EN,
    drive: DRV,
    energised: bool,
}

impl<EN: OutputPin, DRV: OutputPin> SolenoidValve<EN, DRV> {
    pub fn new(enable: EN, drive: DRV) -> Self {
        Self {
            enable,
            drive,
            energised: false,
        }
    }

    pub fn energise(&mut self) -> Result<()> {
        self.enable.set_high().map_err(solenoid_fault)?;
        self.drive.set_high().map_err(solenoid_fault)?;
        self.energised = true;
        Ok(())
    }

    /// Drop drive, then enable.  Both writes are attempted even if the
    /// first fails; the first error is returned.
    pub fn release(&mut self) -> Result<()> {
        let drive = self.drive.set_low().map_err(solenoid_fault);
        let enable = self.enable.set_low().map_err(solenoid_fault);
        drive.and(enable)?;
        self.energised = false;
        Ok(())
    }

    pub fn set(&mut self, energised: bool) -> Result<()> {
        if energised { self.energise() } else { self.release() }
    }

    pub fn is_energised(&self) -> bool {
        self.energised
    }
}

fn solenoid_fault<E: core::fmt::Debug>(e: E) -> Error {
    log::error!("solenoid line write failed: {:?}", e);
    ActuatorError::SolenoidWriteFailed.into()
}
