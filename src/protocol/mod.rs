//! Serial command protocol for the pulse-train mode.

pub mod handshake;

pub use handshake::{Handshake, HandshakeOutput, PulseCommand};
