//! 32-bit RGBA color argument (`r` tag).

use std::fmt;

use serde::{Deserialize, Serialize};
use zerocopy::{AsBytes, FromBytes, FromZeroes};

/// An OSC RGBA color. Wire order is R, G, B, A, one byte per channel, which
/// is also the struct layout.
#[repr(C)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, AsBytes, FromBytes, FromZeroes, Serialize,
    Deserialize,
)]
pub struct Color32 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color32 {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl fmt::Display for Color32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RGBA({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}
