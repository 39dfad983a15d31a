//! PumpCycle Firmware — Main Entry Point
//!
//! Single blocking control loop over a hexagonal core.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter             LogEventSink       UartLink       │
//! │  (Button+Actuator+Clock)     (EventSink)        (SerialPort)   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌──────────────────────────┐  ┌─────────────────────────┐     │
//! │  │ AppService (sequencer)   │  │ PulseMode (serial)      │     │
//! │  │ FSM · profiles · jitter  │  │ handshake · pulse train │     │
//! │  └──────────────────────────┘  └─────────────────────────┘     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info};

use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::{AnyIOPin, AnyInputPin, AnyOutputPin, PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{self, UartDriver};
use esp_idf_hal::units::Hertz;

use pumpcycle::adapters::hardware::HardwareAdapter;
use pumpcycle::adapters::log_sink::LogEventSink;
use pumpcycle::adapters::serial::UartLink;
use pumpcycle::app::ports::ActuatorPort;
use pumpcycle::app::pulse_mode::PulseMode;
use pumpcycle::app::service::AppService;
use pumpcycle::config::{RunMode, SystemConfig};
use pumpcycle::drivers::button::Button;
use pumpcycle::drivers::pump::PumpMotor;
use pumpcycle::drivers::solenoid::SolenoidValve;
use pumpcycle::drivers::status_led::StatusLed;
use pumpcycle::drivers::watchdog::Watchdog;
use pumpcycle::pins;

/// Half-period of the halt heartbeat (1 Hz blink).
const HEARTBEAT_HALF_PERIOD_MS: u32 = 500;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  PumpCycle v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration (compile-time defaults, validated) ───
    let config = SystemConfig::default();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;
    info!(
        "Config: mode={:?} profiles={:?} carrier={}kHz jitter={:?}",
        config.run_mode, config.profile_set, config.carrier_freq_khz, config.jitter_offsets
    );

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;

    // SAFETY: each GPIO number in `pins` is claimed exactly once here.
    let (motor_pin, enable_pin, drive_pin, button_pin, led_pin) = unsafe {
        (
            AnyOutputPin::new(pins::MOTOR_GPIO),
            AnyOutputPin::new(pins::SOLENOID_ENABLE_GPIO),
            AnyOutputPin::new(pins::SOLENOID_DRIVE_GPIO),
            AnyInputPin::new(pins::BUTTON_GPIO),
            AnyOutputPin::new(pins::STATUS_LED_GPIO),
        )
    };

    let mut button = PinDriver::input(button_pin)?;
    button.set_pull(Pull::Down)?;

    let mut hw = HardwareAdapter::new(
        PumpMotor::new(PinDriver::output(motor_pin)?),
        SolenoidValve::new(PinDriver::output(enable_pin)?, PinDriver::output(drive_pin)?),
        Button::new(button),
        Ets,
    );
    // Park every actuator before anything runs.
    hw.all_off()?;

    let mut led = StatusLed::new(PinDriver::output(led_pin)?);
    let mut sink = LogEventSink::new();
    let watchdog = Watchdog::new();

    // ── 4. Run ────────────────────────────────────────────────
    match config.run_mode {
        RunMode::Sequencer => {
            let mut app = AppService::new(config)?;
            led.set(true)?;
            app.start(&mut sink);

            loop {
                watchdog.feed();
                if let Err(e) = app.step(&mut hw, &mut sink) {
                    error!(
                        "Sequencer stopped after {} steps: {} (state {:?})",
                        app.step_count(),
                        e,
                        app.state()
                    );
                    led.set(false)?;
                    return Err(e.into());
                }
            }
        }
        RunMode::PulseTrain => {
            // SAFETY: UART pins are not claimed anywhere else.
            let (tx, rx) = unsafe {
                (
                    AnyOutputPin::new(pins::UART_TX_GPIO),
                    AnyInputPin::new(pins::UART_RX_GPIO),
                )
            };
            let uart_config = uart::config::Config::new().baudrate(Hertz(pins::UART_BAUD));
            let uart = UartDriver::new(
                peripherals.uart1,
                tx,
                rx,
                Option::<AnyIOPin>::None,
                Option::<AnyIOPin>::None,
                &uart_config,
            )?;
            let mut link = UartLink::new(uart);

            let mut pulse = PulseMode::new(config)?;
            info!("Pulse-train mode: waiting for host handshake");
            let cmd = pulse.run_once(&mut hw, &mut link, &mut sink, || watchdog.feed())?;
            info!(
                "Pulse train complete ({}% x {}), halting",
                cmd.duty_percent, cmd.pulses
            );

            loop {
                watchdog.feed();
                led.toggle()?;
                FreeRtos::delay_ms(HEARTBEAT_HALF_PERIOD_MS);
            }
        }
    }
}
