//! Integration tests for the serial pulse-train mode.

use crate::mock_hw::{HwCall, MockHardware, MockSerial, RecordingSink};

use pumpcycle::app::events::AppEvent;
use pumpcycle::app::pulse_mode::{PulseMode, IDLE_POLL_MS};
use pumpcycle::config::SystemConfig;
use pumpcycle::drivers::pump::{BurstLength, MotorBurst};
use pumpcycle::drivers::soft_pwm::Duty;
use pumpcycle::protocol::PulseCommand;

const HANDSHAKE: &[u8] = b"9140523" as &[u8];

fn script(duty: &[u8; 2], pulses: &[u8; 2]) -> Vec<u8> {
    let mut bytes = b"91".to_vec();
    bytes.extend_from_slice(duty);
    bytes.extend_from_slice(b"523");
    bytes.extend_from_slice(pulses);
    bytes.extend_from_slice(b"523");
    bytes
}

#[test]
fn negotiated_train_runs_and_reports_done() {
    let mut pulse = PulseMode::new(SystemConfig::default()).unwrap();
    let mut hw = MockHardware::new();
    let mut link = MockSerial::new(&script(b"40", b"03"));
    let mut sink = RecordingSink::new();

    let cmd = pulse
        .run_once(&mut hw, &mut link, &mut sink, || {})
        .unwrap();
    assert_eq!(
        cmd,
        PulseCommand {
            duty_percent: 40,
            pulses: 3
        }
    );
    assert_eq!(link.tx, b"9134003Done");

    // Every handshake byte is followed by the byte gap.
    let gaps = hw.calls.iter().take_while(|c| **c == HwCall::Wait(10)).count();
    assert_eq!(gaps, script(b"40", b"03").len());

    let train = &hw.calls[gaps..];
    assert_eq!(
        train,
        [
            HwCall::Solenoid(false),
            HwCall::Wait(10),
            HwCall::Motor(MotorBurst {
                length: BurstLength::Pulses(3),
                duty: Duty::Percent(40),
                freq_khz: 20,
            }),
            HwCall::Solenoid(true),
            HwCall::Wait(800),
            HwCall::Solenoid(false),
            HwCall::Wait(800),
        ]
    );
}

#[test]
fn negotiated_percent_sets_on_time_directly() {
    for (digits, on_us) in [(b"50", 25), (b"42", 21)] {
        let mut pulse = PulseMode::new(SystemConfig::default()).unwrap();
        let mut hw = MockHardware::new();
        let mut link = MockSerial::new(&script(digits, b"05"));
        pulse
            .run_once(&mut hw, &mut link, &mut RecordingSink::new(), || {})
            .unwrap();

        // 50 us period at 20 kHz, scaled by percent rather than a 0-255 byte.
        let timing = hw.motor_bursts()[0].timing().unwrap();
        assert_eq!(timing.on_us, on_us);
        assert_eq!(timing.off_us, 50 - on_us);
    }
}

#[test]
fn events_carry_command_and_report() {
    let mut pulse = PulseMode::new(SystemConfig::default()).unwrap();
    let mut hw = MockHardware::new();
    let mut link = MockSerial::new(&script(b"50", b"10"));
    let mut sink = RecordingSink::new();

    pulse
        .run_once(&mut hw, &mut link, &mut sink, || {})
        .unwrap();

    assert!(matches!(
        sink.events.as_slice(),
        [
            AppEvent::PulseCommandReceived(PulseCommand {
                duty_percent: 50,
                pulses: 10
            }),
            AppEvent::PulseTrainDone(report),
        ] if report.cycles == 10 && report.elapsed_us == 500
    ));
}

#[test]
fn idle_polls_wait_and_call_back() {
    let mut pulse = PulseMode::new(SystemConfig::default()).unwrap();
    let mut hw = MockHardware::new();
    let mut link = MockSerial::with_gaps(&script(b"20", b"01"));
    let mut sink = RecordingSink::new();

    let mut idle_calls = 0;
    pulse
        .run_once(&mut hw, &mut link, &mut sink, || idle_calls += 1)
        .unwrap();

    let bytes = script(b"20", b"01").len() as u32;
    assert_eq!(link.inner.idle_reads, bytes);
    // The final byte completes the handshake without an idle callback.
    assert_eq!(idle_calls, 2 * bytes - 1);
    assert_eq!(
        hw.waits().iter().filter(|&&ms| ms == IDLE_POLL_MS).count() as u32,
        bytes
    );
}

#[test]
fn noise_before_sync_is_not_echoed() {
    let mut pulse = PulseMode::new(SystemConfig::default()).unwrap();
    let mut hw = MockHardware::new();
    let mut bytes = b"hello\r\n".to_vec();
    bytes.extend_from_slice(&script(b"99", b"00"));
    let mut link = MockSerial::new(&bytes);
    let mut sink = RecordingSink::new();

    let cmd = pulse
        .run_once(&mut hw, &mut link, &mut sink, || {})
        .unwrap();
    assert_eq!(cmd.pulses, 0);
    assert!(link.tx.starts_with(b"913"));
    assert!(link.tx.ends_with(b"Done"));
    // Zero pulses still runs the solenoid stroke.
    assert!(hw.calls.contains(&HwCall::Solenoid(true)));
}

#[test]
fn poll_returns_none_until_the_last_confirmation_byte() {
    let mut pulse = PulseMode::new(SystemConfig::default()).unwrap();
    let mut hw = MockHardware::new();
    let mut link = MockSerial::new(HANDSHAKE);
    let mut sink = RecordingSink::new();

    for _ in 0..HANDSHAKE.len() {
        assert_eq!(pulse.poll(&mut link, &mut hw, &mut sink).unwrap(), None);
    }
    assert_eq!(link.tx, b"91340");
    assert!(sink.events.is_empty());
}
