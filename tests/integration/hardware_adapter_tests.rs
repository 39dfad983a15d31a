//! The real `HardwareAdapter` and drivers over recording embedded-hal pins.

use std::cell::RefCell;
use std::rc::Rc;

use crate::mock_hw::{
    Bench, DeadPin, Line, MockSerial, RecordingPin, RecordingSink, ScriptedButton, SharedBench,
    VirtualClock,
};

use pumpcycle::adapters::hardware::HardwareAdapter;
use pumpcycle::app::events::AppEvent;
use pumpcycle::app::ports::{ActuatorPort, ButtonPort, ClockPort};
use pumpcycle::app::pulse_mode::PulseMode;
use pumpcycle::app::service::AppService;
use pumpcycle::config::SystemConfig;
use pumpcycle::drivers::button::Button;
use pumpcycle::drivers::pump::{BurstLength, MotorBurst, PumpMotor};
use pumpcycle::drivers::soft_pwm::Duty;
use pumpcycle::drivers::solenoid::SolenoidValve;
use pumpcycle::error::{ActuatorError, Error};

type Adapter = HardwareAdapter<RecordingPin, RecordingPin, RecordingPin, ScriptedButton, VirtualClock>;

fn rig() -> (Adapter, SharedBench, Rc<RefCell<std::collections::VecDeque<bool>>>) {
    let bench: SharedBench = Rc::new(RefCell::new(Bench::default()));
    let (button, levels) = ScriptedButton::new();
    let hw = HardwareAdapter::new(
        PumpMotor::new(RecordingPin::new(Line::Motor, &bench)),
        SolenoidValve::new(
            RecordingPin::new(Line::SolenoidEnable, &bench),
            RecordingPin::new(Line::SolenoidDrive, &bench),
        ),
        Button::new(button),
        VirtualClock::new(&bench),
    );
    (hw, bench, levels)
}

#[test]
fn burst_edges_and_busy_wait_match_integer_timing() {
    let (mut hw, bench, _) = rig();
    let burst = MotorBurst {
        length: BurstLength::Millis(10),
        duty: Duty::Byte(128),
        freq_khz: 3, // period truncates to 333 us
    };
    let report = hw.drive_motor(&burst).unwrap();

    assert_eq!(report.cycles, 30); // 10_000 / 333
    let b = bench.borrow();
    assert_eq!(b.motor_highs, 30);
    assert_eq!(b.motor_lows, 31); // one per cycle plus the park
    assert!(!b.motor_level);
    assert_eq!(b.elapsed_ns, 30 * 333 * 1000);
    assert_eq!(hw.motor().burst_count(), 1);
}

#[test]
fn full_duty_never_drops_the_line_inside_the_waveform() {
    let (mut hw, bench, _) = rig();
    let burst = MotorBurst {
        length: BurstLength::Pulses(5),
        duty: Duty::Byte(255),
        freq_khz: 20,
    };
    let report = hw.drive_motor(&burst).unwrap();
    assert_eq!(report.low_writes, 0);
    assert_eq!(bench.borrow().motor_lows, 1); // trailing park only
}

#[test]
fn solenoid_pair_and_all_off() {
    let (mut hw, bench, _) = rig();
    hw.set_solenoid(true).unwrap();
    assert!(hw.solenoid().is_energised());
    hw.all_off().unwrap();
    assert!(!hw.solenoid().is_energised());
    assert_eq!(
        bench.borrow().solenoid_writes,
        [
            (Line::SolenoidEnable, true),
            (Line::SolenoidDrive, true),
            (Line::SolenoidDrive, false),
            (Line::SolenoidEnable, false),
        ]
    );
}

#[test]
fn all_off_drops_enable_when_drive_line_fails() {
    let bench: SharedBench = Rc::new(RefCell::new(Bench::default()));
    let (button, _) = ScriptedButton::new();
    let mut hw = HardwareAdapter::new(
        PumpMotor::new(RecordingPin::new(Line::Motor, &bench)),
        SolenoidValve::new(RecordingPin::new(Line::SolenoidEnable, &bench), DeadPin),
        Button::new(button),
        VirtualClock::new(&bench),
    );

    assert_eq!(
        hw.all_off(),
        Err(Error::Actuator(ActuatorError::SolenoidWriteFailed))
    );
    let b = bench.borrow();
    assert_eq!(b.motor_lows, 1);
    assert!(!b.motor_level);
    assert_eq!(b.solenoid_writes, [(Line::SolenoidEnable, false)]);
}

#[test]
fn button_and_clock_ports() {
    let (mut hw, bench, levels) = rig();
    levels.borrow_mut().extend([true, false]);
    assert!(hw.is_pressed().unwrap());
    assert!(!hw.is_pressed().unwrap());
    assert!(!hw.is_pressed().unwrap());
    hw.wait_ms(7);
    assert_eq!(bench.borrow().elapsed_ns, 7_000_000);
}

#[test]
fn sequencer_step_over_real_drivers() {
    let (mut hw, bench, levels) = rig();
    let mut config = SystemConfig::default();
    config.jitter_offsets.clear();
    config.jitter_offsets.push(0).unwrap();

    let mut app = AppService::new(config).unwrap();
    let mut sink = RecordingSink::new();
    app.start(&mut sink);
    levels.borrow_mut().extend([true, false]);

    for _ in 0..20 {
        app.step(&mut hw, &mut sink).unwrap();
        if sink.count(|e| matches!(e, AppEvent::StepCompleted { .. })) > 0 {
            break;
        }
    }

    let b = bench.borrow();
    // Warm-up 35 ms and build-up 165 ms at 50 us periods.
    assert_eq!(b.motor_highs, 700 + 3300);
    // The motor is parked low whenever the solenoid moves.
    assert!(b.motor_level_at_solenoid.iter().all(|high| !high));
    assert_eq!(b.solenoid_writes.len(), 4);
}

#[test]
fn pulse_train_over_real_drivers() {
    let (mut hw, bench, _) = rig();
    let mut link = MockSerial::new(b"9125523045239");
    let mut sink = RecordingSink::new();
    let mut pulse = PulseMode::new(SystemConfig::default()).unwrap();

    let cmd = pulse.run_once(&mut hw, &mut link, &mut sink, || {}).unwrap();
    assert_eq!((cmd.duty_percent, cmd.pulses), (25, 4));
    assert_eq!(link.tx, b"9132504Done");

    let b = bench.borrow();
    assert_eq!(b.motor_highs, 4);
    // Release (2 writes), energise (2), release (2).
    assert_eq!(b.solenoid_writes.len(), 6);
}
