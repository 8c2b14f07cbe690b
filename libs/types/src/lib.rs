//! # OSC Value Types
//!
//! ## Purpose
//!
//! Pure data structures shared by the codec and network layers: the type-tag
//! registry and the fixed-layout argument types (MIDI tuple, RGBA color, NTP
//! timestamp). No protocol logic lives here - encoding/decoding rules belong
//! to `osc-codec`, transport to `osc-network`.
//!
//! ## Architecture Role
//!
//! ```text
//! osc-types → osc-codec → osc-network
//!     ↑           ↓            ↓
//! Pure Data   Wire Rules   Transport
//! Structures  Parse/Write  Sockets/Dispatch
//! ```

pub mod color;
pub mod midi;
pub mod tags;
pub mod time;

pub use color::Color32;
pub use midi::MidiMessage;
pub use tags::{TypeTag, WireSize};
pub use time::NtpTimestamp;
