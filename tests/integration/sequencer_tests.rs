//! Integration tests for the button → AppService → FSM → actuator pipeline.
//!
//! Drive the sequencer with scripted button samples against the
//! recording [`MockHardware`] and check the resulting burst history.

use crate::mock_hw::{HwCall, MockHardware, RecordingSink};

use pumpcycle::app::events::AppEvent;
use pumpcycle::app::service::AppService;
use pumpcycle::config::SystemConfig;
use pumpcycle::drivers::button::Gesture;
use pumpcycle::drivers::pump::{BurstLength, MotorBurst};
use pumpcycle::drivers::soft_pwm::Duty;
use pumpcycle::error::{ActuatorError, Error};
use pumpcycle::fsm::StateId;
use pumpcycle::profile::{ProfileId, ProfileSet};

const MAX_STEPS: usize = 10_000;

fn make_app(config: SystemConfig) -> (AppService, MockHardware, RecordingSink) {
    let mut app = AppService::new(config).expect("valid config");
    let hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    app.start(&mut sink);
    (app, hw, sink)
}

fn jitter(offsets: &[i16]) -> SystemConfig {
    let mut config = SystemConfig::default();
    config.jitter_offsets.clear();
    for &j in offsets {
        config.jitter_offsets.push(j).expect("capacity");
    }
    config
}

/// Step the service until `done` holds for the sink and the sequencer is
/// back in `AwaitPress`.
fn run_until(
    app: &mut AppService,
    hw: &mut MockHardware,
    sink: &mut RecordingSink,
    done: impl Fn(&RecordingSink) -> bool,
) {
    for _ in 0..MAX_STEPS {
        app.step(hw, sink).expect("step");
        if done(sink) && app.is_idle() {
            return;
        }
    }
    panic!("sequencer did not settle, state {:?}", app.state());
}

fn step_completions(sink: &RecordingSink) -> usize {
    sink.count(|e| matches!(e, AppEvent::StepCompleted { .. }))
}

fn profile_changes(sink: &RecordingSink) -> usize {
    sink.count(|e| matches!(e, AppEvent::ProfileChanged { .. }))
}

/// One short press that runs the step under the cursor to completion.
fn short_press(app: &mut AppService, hw: &mut MockHardware, sink: &mut RecordingSink) {
    let before = step_completions(sink);
    hw.press(0);
    run_until(app, hw, sink, |s| step_completions(s) > before);
}

/// One long press, applied and released.
fn long_press(app: &mut AppService, hw: &mut MockHardware, sink: &mut RecordingSink) {
    let before = profile_changes(sink);
    hw.press(11);
    run_until(app, hw, sink, |s| profile_changes(s) > before);
}

fn started_steps(sink: &RecordingSink) -> Vec<(ProfileId, u8)> {
    sink.events
        .iter()
        .filter_map(|e| match e {
            AppEvent::StepStarted { profile, step, .. } => Some((*profile, *step)),
            _ => None,
        })
        .collect()
}

// ── Idle behaviour ────────────────────────────────────────────

#[test]
fn idle_button_never_actuates() {
    let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
    for _ in 0..200 {
        app.step(&mut hw, &mut sink).unwrap();
    }
    assert_eq!(app.state(), StateId::AwaitPress);
    assert!(hw.calls.iter().all(|c| *c == HwCall::Wait(10)));
    assert!(hw.samples >= 200);
}

#[test]
fn start_event_names_default_profile() {
    let (_app, _hw, sink) = make_app(SystemConfig::default());
    assert_eq!(
        sink.events[0],
        AppEvent::Started {
            state: StateId::AwaitPress,
            profile: ProfileId::Swing
        }
    );
}

// ── Step 0 end-to-end ─────────────────────────────────────────

#[test]
fn step_zero_runs_warmup_and_jittered_build_ups() {
    let (mut app, mut hw, mut sink) = make_app(jitter(&[-120, 0, 120]));
    short_press(&mut app, &mut hw, &mut sink);

    let warmup = MotorBurst {
        length: BurstLength::Millis(35),
        duty: Duty::Byte(95),
        freq_khz: 20,
    };
    let build_up = |ms| MotorBurst {
        length: BurstLength::Millis(ms),
        duty: Duty::Byte(102), // 40 % of 255
        freq_khz: 20,
    };
    assert_eq!(
        hw.motor_bursts(),
        [
            warmup,
            build_up(145),
            warmup,
            build_up(165),
            warmup,
            build_up(185)
        ]
    );

    // Each build-up is followed by one solenoid stroke of the dwell time.
    let actuations = hw.actuations(&[10, 100]);
    assert_eq!(
        actuations,
        [
            HwCall::Motor(warmup),
            HwCall::Motor(build_up(145)),
            HwCall::Solenoid(true),
            HwCall::Wait(200),
            HwCall::Solenoid(false),
            HwCall::Motor(warmup),
            HwCall::Motor(build_up(165)),
            HwCall::Solenoid(true),
            HwCall::Wait(200),
            HwCall::Solenoid(false),
            HwCall::Motor(warmup),
            HwCall::Motor(build_up(185)),
            HwCall::Solenoid(true),
            HwCall::Wait(200),
            HwCall::Solenoid(false),
        ]
    );

    assert_eq!(app.cursor().get(), 1);
    let fired: Vec<i16> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::BurstFired {
                step: 0,
                jitter_permille,
                ..
            } => Some(*jitter_permille),
            _ => None,
        })
        .collect();
    assert_eq!(fired, [-120, 0, 120]);
}

#[test]
fn step_events_describe_the_plan() {
    let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
    short_press(&mut app, &mut hw, &mut sink);

    assert!(sink.events.contains(&AppEvent::GestureDetected(Gesture::ShortPress)));
    assert!(sink.events.contains(&AppEvent::StepStarted {
        profile: ProfileId::Swing,
        step: 0,
        sub_phase: pumpcycle::profile::SubPhase::Stimulation,
        build_up_ms: 200,
        duty: 102,
    }));
    assert!(sink.events.contains(&AppEvent::StepCompleted {
        profile: ProfileId::Swing,
        step: 0
    }));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::BurstFired { .. })), 7);
}

// ── Gesture boundary ──────────────────────────────────────────

#[test]
fn held_nine_or_ten_polls_is_short_eleven_is_long() {
    for (held, expect) in [
        (9, Gesture::ShortPress),
        (10, Gesture::ShortPress),
        (11, Gesture::LongPress),
    ] {
        let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
        hw.press(held);
        for _ in 0..(held as usize + 3) {
            app.step(&mut hw, &mut sink).unwrap();
        }
        let gestures: Vec<Gesture> = sink
            .events
            .iter()
            .filter_map(|e| match e {
                AppEvent::GestureDetected(g) => Some(*g),
                _ => None,
            })
            .collect();
        assert_eq!(gestures, [expect], "held {held} polls");
    }
}

#[test]
fn press_is_measured_at_the_coarse_interval() {
    let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
    hw.press(5);
    for _ in 0..8 {
        app.step(&mut hw, &mut sink).unwrap();
    }
    let waits = hw.waits();
    assert_eq!(waits.iter().filter(|&&ms| ms == 100).count(), 6);
}

// ── Profile toggling ──────────────────────────────────────────

#[test]
fn long_presses_alternate_profiles_and_reset_cursor() {
    let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
    short_press(&mut app, &mut hw, &mut sink);
    short_press(&mut app, &mut hw, &mut sink);
    assert_eq!(app.cursor().get(), 2);

    long_press(&mut app, &mut hw, &mut sink);
    assert_eq!(app.active_profile(), ProfileId::Solo);
    assert_eq!(app.cursor().get(), 0);

    short_press(&mut app, &mut hw, &mut sink);
    assert_eq!(app.cursor().get(), 1);

    long_press(&mut app, &mut hw, &mut sink);
    assert_eq!(app.active_profile(), ProfileId::Swing);
    assert_eq!(app.cursor().get(), 0);

    let changes: Vec<(ProfileId, ProfileId)> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::ProfileChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        changes,
        [
            (ProfileId::Swing, ProfileId::Solo),
            (ProfileId::Solo, ProfileId::Swing)
        ]
    );
}

#[test]
fn long_press_does_not_actuate() {
    let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
    long_press(&mut app, &mut hw, &mut sink);
    assert!(hw.motor_bursts().is_empty());
    assert!(!hw.calls.iter().any(|c| matches!(c, HwCall::Solenoid(_))));
}

#[test]
fn solo_step_uses_solo_tables() {
    let (mut app, mut hw, mut sink) = make_app(jitter(&[0]));
    long_press(&mut app, &mut hw, &mut sink);
    short_press(&mut app, &mut hw, &mut sink);
    assert_eq!(
        hw.motor_bursts()[1],
        MotorBurst {
            length: BurstLength::Millis(145), // 180 - 35
            duty: Duty::Byte(89),             // 35 % of 255
            freq_khz: 20,
        }
    );
}

#[test]
fn held_button_toggles_once_until_released() {
    let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
    // Held far beyond the threshold.
    hw.script(std::iter::repeat(true).take(60));
    for _ in 0..80 {
        app.step(&mut hw, &mut sink).unwrap();
    }
    assert_eq!(profile_changes(&sink), 1);
    assert_eq!(app.active_profile(), ProfileId::Solo);
    assert!(hw.motor_bursts().is_empty());
}

#[test]
fn solo_only_long_press_restarts_without_switching() {
    let config = SystemConfig {
        profile_set: ProfileSet::SoloOnly,
        default_profile: ProfileId::Solo,
        ..SystemConfig::default()
    };
    let (mut app, mut hw, mut sink) = make_app(config);
    short_press(&mut app, &mut hw, &mut sink);
    assert_eq!(app.cursor().get(), 1);

    long_press(&mut app, &mut hw, &mut sink);
    assert_eq!(app.active_profile(), ProfileId::Solo);
    assert_eq!(app.cursor().get(), 0);
    assert!(sink.events.contains(&AppEvent::ProfileChanged {
        from: ProfileId::Solo,
        to: ProfileId::Solo
    }));
}

// ── Cursor walk ───────────────────────────────────────────────

#[test]
fn short_presses_visit_every_step_then_wrap() {
    let (mut app, mut hw, mut sink) = make_app(jitter(&[0]));
    for _ in 0..19 {
        short_press(&mut app, &mut hw, &mut sink);
    }

    let steps: Vec<u8> = started_steps(&sink).iter().map(|(_, s)| *s).collect();
    let mut expected: Vec<u8> = (0..18).collect();
    expected.push(0);
    assert_eq!(steps, expected);
    assert_eq!(
        sink.count(|e| *e == AppEvent::CycleWrapped(ProfileId::Swing)),
        1
    );
    assert_eq!(app.cursor().get(), 1);
}

#[test]
fn expression_steps_use_the_second_half_of_the_table() {
    let (mut app, mut hw, mut sink) = make_app(jitter(&[0]));
    for _ in 0..10 {
        short_press(&mut app, &mut hw, &mut sink);
    }
    let last = sink
        .events
        .iter()
        .rev()
        .find_map(|e| match e {
            AppEvent::StepStarted {
                step,
                sub_phase,
                build_up_ms,
                ..
            } => Some((*step, *sub_phase, *build_up_ms)),
            _ => None,
        })
        .unwrap();
    assert_eq!(last, (9, pumpcycle::profile::SubPhase::Expression, 420));
}

// ── Failure handling ──────────────────────────────────────────

#[test]
fn motor_failure_stops_everything_and_surfaces_error() {
    let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
    hw.fail_motor = true;
    hw.press(0);

    let mut result = Ok(());
    for _ in 0..20 {
        result = app.step(&mut hw, &mut sink);
        if result.is_err() {
            break;
        }
    }
    assert_eq!(
        result,
        Err(Error::Actuator(ActuatorError::MotorWriteFailed))
    );
    assert_eq!(hw.calls.last(), Some(&HwCall::AllOff));
}
