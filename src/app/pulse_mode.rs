//! Serial pulse-train runner.
//!
//! The alternative front-end to the button sequencer: a host negotiates
//! a duty and a pulse count over the UART handshake, the device fires
//! exactly that many PWM cycles followed by one solenoid stroke, reports
//! `"Done"` and stops.
//!
//! ```text
//!   SerialPort ──▶ Handshake ──▶ PulseCommand ──▶ train ──▶ "Done"
//! ```
//!
//! Train sequence:
//!
//! | # | Action                                         |
//! |---|------------------------------------------------|
//! | 1 | solenoid pair low, wait `pulse_settle_ms`       |
//! | 2 | `pulses` PWM cycles at `pulse_freq_khz`, % duty  |
//! | 3 | solenoid pair high for `pulse_dwell_ms`, low    |
//! | 4 | wait `pulse_dwell_ms`, send `"Done"`            |

use log::info;

use crate::config::SystemConfig;
use crate::drivers::pump::{BurstLength, MotorBurst};
use crate::drivers::soft_pwm::{Duty, PwmReport};
use crate::error::Result;
use crate::protocol::handshake::DONE_MESSAGE;
use crate::protocol::{Handshake, PulseCommand};

use super::events::AppEvent;
use super::ports::{ActuatorPort, ClockPort, EventSink, SerialPort};

/// Pause between polls of an empty receive buffer.
pub const IDLE_POLL_MS: u32 = 1;

pub struct PulseMode {
    config: SystemConfig,
    handshake: Handshake,
}

impl PulseMode {
    pub fn new(config: SystemConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            handshake: Handshake::new(),
        })
    }

    /// Process at most one received byte.
    ///
    /// Returns the command once the handshake completes.  An empty
    /// receive buffer costs one [`IDLE_POLL_MS`] wait.
    pub fn poll(
        &mut self,
        link: &mut impl SerialPort,
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
    ) -> Result<Option<PulseCommand>> {
        let Some(byte) = link.read_byte()? else {
            clock.wait_ms(IDLE_POLL_MS);
            return Ok(None);
        };

        let out = self.handshake.feed(byte);
        if !out.reply.is_empty() {
            link.write_bytes(&out.reply)?;
        }
        clock.wait_ms(self.config.serial_byte_gap_ms);

        if let Some(cmd) = out.command {
            info!(
                "PulseMode: command received, duty {}%, {} pulses",
                cmd.duty_percent, cmd.pulses
            );
            sink.emit(&AppEvent::PulseCommandReceived(cmd));
        }
        Ok(out.command)
    }

    /// Execute the negotiated train and report completion to the host.
    pub fn run_train(
        &mut self,
        cmd: PulseCommand,
        hw: &mut (impl ActuatorPort + ClockPort),
        link: &mut impl SerialPort,
        sink: &mut impl EventSink,
    ) -> Result<PwmReport> {
        let burst = MotorBurst {
            length: BurstLength::Pulses(u32::from(cmd.pulses)),
            duty: Duty::Percent(cmd.duty_percent),
            freq_khz: self.config.pulse_freq_khz,
        };

        hw.set_solenoid(false)?;
        hw.wait_ms(self.config.pulse_settle_ms);

        let report = hw.drive_motor(&burst)?;

        hw.set_solenoid(true)?;
        hw.wait_ms(self.config.pulse_dwell_ms);
        hw.set_solenoid(false)?;
        hw.wait_ms(self.config.pulse_dwell_ms);

        link.write_bytes(DONE_MESSAGE)?;
        info!("PulseMode: train done, {} cycles", report.cycles);
        sink.emit(&AppEvent::PulseTrainDone(report));
        Ok(report)
    }

    /// Negotiate one command and run it.
    ///
    /// `on_idle` runs after every poll that did not complete the
    /// handshake (the firmware feeds the watchdog there).  On a hardware
    /// error every actuator is switched off before the error is returned.
    pub fn run_once(
        &mut self,
        hw: &mut (impl ActuatorPort + ClockPort),
        link: &mut impl SerialPort,
        sink: &mut impl EventSink,
        mut on_idle: impl FnMut(),
    ) -> Result<PulseCommand> {
        let cmd = loop {
            if let Some(cmd) = self.poll(link, hw, sink)? {
                break cmd;
            }
            on_idle();
        };

        if let Err(e) = self.run_train(cmd, hw, link, sink) {
            log::error!("PulseMode: train failed: {}", e);
            if let Err(off) = hw.all_off() {
                log::error!("all_off after failure also failed: {}", off);
            }
            return Err(e);
        }
        self.handshake.reset();
        Ok(cmd)
    }
}
