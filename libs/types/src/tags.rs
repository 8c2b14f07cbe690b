//! # OSC Type Tag Registry
//!
//! Single-byte ASCII tags identifying an argument's wire encoding, per the
//! OSC 1.0 specification plus the commonly supported extensions. The tag
//! byte doubles as the enum discriminant, so conversion from wire bytes is a
//! range check rather than a lookup table.
//!
//! Not every byte value is a valid tag: the parser scans a type-tag string
//! until the first unsupported byte, which is how tag strings terminate.

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

/// A single OSC type tag.
///
/// Standard 1.0 tags are `i`, `f`, `s` and `b`; the rest are extensions
/// widely implemented by OSC peers (and by the systems this crate talks to).
#[repr(u8)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize,
)]
pub enum TypeTag {
    /// `F` - boolean false, no payload bytes
    False = b'F',
    /// `I` - infinitum, no payload bytes
    Infinitum = b'I',
    /// `N` - nil, no payload bytes
    Nil = b'N',
    /// `S` - alternate string encoding, same wire rule as `s`
    AltString = b'S',
    /// `T` - boolean true, no payload bytes
    True = b'T',
    /// `b` - length-prefixed blob, standard
    Blob = b'b',
    /// `c` - ascii character carried in a 4-byte block
    AsciiChar = b'c',
    /// `d` - 64-bit float
    Float64 = b'd',
    /// `f` - 32-bit float, standard
    Float32 = b'f',
    /// `h` - 64-bit integer
    Int64 = b'h',
    /// `i` - 32-bit integer, standard
    Int32 = b'i',
    /// `m` - 4-byte MIDI message
    Midi = b'm',
    /// `r` - 32-bit RGBA color
    Color = b'r',
    /// `s` - null-terminated ascii string, standard
    String = b's',
    /// `t` - 64-bit NTP timestamp
    TimeTag = b't',
}

/// How many wire bytes an argument of a given tag occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireSize {
    /// Fixed payload size in bytes (always a multiple of 4).
    Fixed(usize),
    /// No payload at all - the tag byte carries the whole value (T/F/N/I).
    Empty,
    /// Null-terminated, padded to 4 bytes with at least one trailing NUL.
    String,
    /// Big-endian i32 length prefix, then that many bytes padded to 4.
    Blob,
}

impl TypeTag {
    /// Interpret a wire byte as a type tag. Unsupported bytes return `None`,
    /// which terminates type-tag-string scanning.
    #[inline]
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::try_from(byte).ok()
    }

    /// The wire-size class used by the offset scanner.
    #[inline]
    pub fn wire_size(self) -> WireSize {
        match self {
            TypeTag::Int32 | TypeTag::Float32 | TypeTag::Color | TypeTag::AsciiChar
            | TypeTag::Midi => WireSize::Fixed(4),
            TypeTag::Int64 | TypeTag::Float64 | TypeTag::TimeTag => WireSize::Fixed(8),
            TypeTag::True | TypeTag::False | TypeTag::Nil | TypeTag::Infinitum => WireSize::Empty,
            TypeTag::String | TypeTag::AltString => WireSize::String,
            TypeTag::Blob => WireSize::Blob,
        }
    }

    /// The tag's ascii character, as written into a type-tag string.
    #[inline]
    pub fn as_char(self) -> char {
        self as u8 as char
    }
}
