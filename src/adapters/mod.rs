//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements     | Connects to                         |
//! |-------------|----------------|-------------------------------------|
//! | `hardware`  | ButtonPort     | embedded-hal input pin              |
//! |             | ActuatorPort   | motor line, solenoid enable/drive   |
//! |             | ClockPort      | busy-wait delay (`Ets` on target)   |
//! | `log_sink`  | EventSink      | Serial log output                   |
//! | `serial`    | SerialPort     | ESP-IDF UART driver (target only)   |

pub mod hardware;
pub mod log_sink;
#[cfg(target_os = "espidf")]
pub mod serial;
