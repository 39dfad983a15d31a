//! Byte-fed parser for the serial pulse-train handshake.
//!
//! Wire exchange (host → device on the left):
//! ```text
//!   '9'            ──▶            "913"      sync; ignored until seen
//!   x (≠ '1')      ──▶            "913"      re-sync
//!   '1'            ──▶                       open duty field
//!   d1             ──▶            d1         first digit, echoed
//!   d2             ──▶            d2         second digit, echoed
//!   '5' '2' '3'    ──▶                       commit duty
//!   d1 d2 '5' '2' '3'  ──▶        d1 d2      pulse count, same framing
//! ```
//!
//! Non-digit bytes inside a digit slot are ignored.  A byte that breaks
//! the `523` confirmation discards the field and is re-examined as the
//! first digit of a fresh attempt.  Once the pulse count is committed the
//! parser yields a [`PulseCommand`] and ignores everything until
//! [`Handshake::reset`].
//!
//! The parser is pure: it never touches the UART and never waits.

use heapless::Vec;

/// Device-side sync reply.
pub const SYNC_REPLY: &[u8] = b"913";
/// Completion message sent after the pulse train.
pub const DONE_MESSAGE: &[u8] = b"Done";

const SYNC: u8 = b'9';
const OPEN: u8 = b'1';
const CONFIRM: &[u8; 3] = b"523";

/// Largest reply one byte can trigger.
pub const MAX_REPLY: usize = 4;

/// Fully negotiated pulse-train request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseCommand {
    /// Motor duty, 0–99 %.
    pub duty_percent: u8,
    /// Number of PWM cycles, 0–99.
    pub pulses: u8,
}

/// What feeding one byte produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandshakeOutput {
    /// Bytes to write back, possibly empty.
    pub reply: Vec<u8, MAX_REPLY>,
    /// Set on the byte that commits the pulse count.
    pub command: Option<PulseCommand>,
}

impl HandshakeOutput {
    fn reply(bytes: &[u8]) -> Self {
        let mut out = Self::default();
        // Every reply is at most MAX_REPLY bytes.
        let _ = out.reply.extend_from_slice(bytes);
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Duty,
    Pulses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AwaitSync,
    AwaitOpen,
    FirstDigit(Field),
    SecondDigit(Field, u8),
    Confirm { field: Field, value: u8, matched: usize },
    Complete,
}

/// Streaming handshake parser.
#[derive(Debug, Clone)]
pub struct Handshake {
    phase: Phase,
    duty: u8,
}

impl Default for Handshake {
    fn default() -> Self {
        Self::new()
    }
}

impl Handshake {
    pub fn new() -> Self {
        Self {
            phase: Phase::AwaitSync,
            duty: 0,
        }
    }

    /// Start over, waiting for a fresh sync byte.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// `true` once a command has been produced.
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// Feed one received byte.
    pub fn feed(&mut self, byte: u8) -> HandshakeOutput {
        match self.phase {
            Phase::AwaitSync => {
                if byte == SYNC {
                    self.phase = Phase::AwaitOpen;
                    HandshakeOutput::reply(SYNC_REPLY)
                } else {
                    HandshakeOutput::default()
                }
            }
            Phase::AwaitOpen => {
                if byte == OPEN {
                    self.phase = Phase::FirstDigit(Field::Duty);
                    HandshakeOutput::default()
                } else {
                    HandshakeOutput::reply(SYNC_REPLY)
                }
            }
            Phase::FirstDigit(field) => self.first_digit(field, byte),
            Phase::SecondDigit(field, d1) => match digit(byte) {
                Some(d2) => {
                    self.phase = Phase::Confirm {
                        field,
                        value: d1 * 10 + d2,
                        matched: 0,
                    };
                    HandshakeOutput::reply(&[byte])
                }
                None => HandshakeOutput::default(),
            },
            Phase::Confirm {
                field,
                value,
                matched,
            } => {
                if byte != CONFIRM[matched] {
                    log::debug!("handshake: {:?} field discarded at 0x{:02x}", field, byte);
                    return self.first_digit(field, byte);
                }
                if matched + 1 < CONFIRM.len() {
                    self.phase = Phase::Confirm {
                        field,
                        value,
                        matched: matched + 1,
                    };
                    return HandshakeOutput::default();
                }
                self.commit(field, value)
            }
            Phase::Complete => HandshakeOutput::default(),
        }
    }

    fn first_digit(&mut self, field: Field, byte: u8) -> HandshakeOutput {
        match digit(byte) {
            Some(d1) => {
                self.phase = Phase::SecondDigit(field, d1);
                HandshakeOutput::reply(&[byte])
            }
            None => {
                self.phase = Phase::FirstDigit(field);
                HandshakeOutput::default()
            }
        }
    }

    fn commit(&mut self, field: Field, value: u8) -> HandshakeOutput {
        match field {
            Field::Duty => {
                self.duty = value;
                self.phase = Phase::FirstDigit(Field::Pulses);
                HandshakeOutput::default()
            }
            Field::Pulses => {
                self.phase = Phase::Complete;
                HandshakeOutput {
                    reply: Vec::new(),
                    command: Some(PulseCommand {
                        duty_percent: self.duty,
                        pulses: value,
                    }),
                }
            }
        }
    }
}

fn digit(byte: u8) -> Option<u8> {
    byte.is_ascii_digit().then(|| byte - b'0')
}
