//! 4-byte MIDI message argument (`m` tag).

use std::fmt;

use zerocopy::{AsBytes, FromBytes, FromZeroes};

/// An OSC MIDI message: port id, status byte, then two data bytes, in wire
/// order. The struct layout is the wire layout, so reads and writes are
/// byte copies.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, AsBytes, FromBytes, FromZeroes)]
pub struct MidiMessage {
    pub port_id: u8,
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
}

impl MidiMessage {
    pub fn new(port_id: u8, status: u8, data1: u8, data2: u8) -> Self {
        Self { port_id, status, data1, data2 }
    }
}

impl fmt::Display for MidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Port ID: {}, Status: {}, Data: {} , {}",
            self.port_id, self.status, self.data1, self.data2
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zerocopy::FromBytes;

    #[test]
    fn layout_matches_wire_order() {
        let midi = MidiMessage::read_from(&[1u8, 0x90, 60, 127][..]).unwrap();
        assert_eq!(midi, MidiMessage::new(1, 0x90, 60, 127));
        assert_eq!(midi.as_bytes(), &[1, 0x90, 60, 127]);
    }
}
