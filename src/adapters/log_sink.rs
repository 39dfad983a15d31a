//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! One tagged line per event so a serial capture can be grepped.

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { state, profile } => {
                info!("START | initial_state={:?} profile={}", state, profile);
            }
            AppEvent::StateChanged { from, to } => {
                debug!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::GestureDetected(gesture) => {
                info!("BUTTON | {:?}", gesture);
            }
            AppEvent::ProfileChanged { from, to } => {
                info!("PROFILE | {} -> {} | step=0", from, to);
            }
            AppEvent::StepStarted {
                profile,
                step,
                sub_phase,
                build_up_ms,
                duty,
            } => {
                info!(
                    "STEP | {} #{} ({}) | build_up={}ms duty={}/255",
                    profile, step, sub_phase, build_up_ms, duty
                );
            }
            AppEvent::BurstFired {
                step,
                jitter_permille,
                report,
            } => {
                info!(
                    "BURST | step={} jitter={:+}\u{2030} | cycles={} high={} low={} t={}us",
                    step,
                    jitter_permille,
                    report.cycles,
                    report.high_writes,
                    report.low_writes,
                    report.elapsed_us
                );
            }
            AppEvent::StepCompleted { profile, step } => {
                info!("STEP | {} #{} complete", profile, step);
            }
            AppEvent::CycleWrapped(profile) => {
                info!("CYCLE | {} wrapped to step 0", profile);
            }
            AppEvent::PulseCommandReceived(cmd) => {
                info!(
                    "PULSE | command duty={}% pulses={}",
                    cmd.duty_percent, cmd.pulses
                );
            }
            AppEvent::PulseTrainDone(report) => {
                info!(
                    "PULSE | done cycles={} t={}us",
                    report.cycles, report.elapsed_us
                );
            }
        }
    }
}
