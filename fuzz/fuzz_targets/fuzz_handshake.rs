//! Fuzz target: `Handshake::feed`
//!
//! Drives arbitrary byte sequences into the serial handshake parser and
//! asserts that it never panics, never produces an oversized reply,
//! yields at most one command, and behaves identically after a reset.
//!
//! cargo fuzz run fuzz_handshake

#![no_main]

use libfuzzer_sys::fuzz_target;
use pumpcycle::protocol::{Handshake, PulseCommand};

fn drive(hs: &mut Handshake, data: &[u8]) -> (usize, Option<PulseCommand>) {
    let mut replied = 0;
    let mut command = None;
    for &b in data {
        let out = hs.feed(b);
        assert!(out.reply.len() <= 3, "reply longer than the sync prompt");
        replied += out.reply.len();
        if let Some(cmd) = out.command {
            assert!(command.is_none(), "second command without reset");
            assert!(cmd.duty_percent < 100 && cmd.pulses < 100);
            command = Some(cmd);
        }
    }
    (replied, command)
}

fuzz_target!(|data: &[u8]| {
    let mut hs = Handshake::new();
    let first = drive(&mut hs, data);

    // After a reset the parser must replay identically.
    hs.reset();
    let second = drive(&mut hs, data);
    assert_eq!(first, second);
});
