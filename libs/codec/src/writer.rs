//! # OSC Message Writer
//!
//! Serializes typed arguments into wire format: big-endian numerics, NUL
//! padding to 4-byte boundaries for strings and blobs. The output buffer
//! grows as needed and `reset()` rewinds it without releasing storage, so a
//! long-lived writer settles at its high-water mark and stops allocating.
//!
//! A full message is: `reset` (or [`OscWriter::begin_message`]), the
//! address under the string rule, the type-tag string under the string rule
//! with its leading ',', then each argument in tag order. After every
//! complete element write the buffer length is a multiple of 4.

use osc_types::{Color32, MidiMessage, NtpTimestamp};
use zerocopy::AsBytes;

use crate::constants::{blob_padded_len, string_slot_len, BUNDLE_TAG, DEFAULT_BUFFER_SIZE};

/// Wire-format serializer over a growable byte buffer.
#[derive(Debug)]
pub struct OscWriter {
    buffer: Vec<u8>,
}

impl Default for OscWriter {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE)
    }
}

impl OscWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { buffer: Vec::with_capacity(capacity) }
    }

    /// Rewind to empty without deallocating.
    #[inline]
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The bytes written so far.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Reset, then write the address and the type-tag string in one call.
    /// `type_tags` must include its leading ',' (e.g. `",fi"`).
    pub fn begin_message(&mut self, address: &str, type_tags: &str) {
        self.reset();
        self.write_str(address);
        self.write_str(type_tags);
    }

    /// Write a 32-bit integer element.
    pub fn write_int32(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Write a 32-bit float element.
    pub fn write_float32(&mut self, value: f32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Write a 64-bit integer element.
    pub fn write_int64(&mut self, value: i64) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Write a 64-bit float element.
    pub fn write_float64(&mut self, value: f64) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Write an ascii string element: the bytes, a NUL terminator, and
    /// padding out to the 4-byte slot (a length already on the boundary
    /// gains four full padding bytes).
    pub fn write_str(&mut self, value: &str) {
        self.buffer.extend_from_slice(value.as_bytes());
        let padded = string_slot_len(value.len());
        self.buffer.resize(self.buffer.len() + (padded - value.len()), 0);
    }

    /// Write a blob element: big-endian i32 length, the bytes, then zero
    /// padding to the next 4-byte boundary.
    pub fn write_blob(&mut self, value: &[u8]) {
        self.write_int32(value.len() as i32);
        self.buffer.extend_from_slice(value);
        let padded = blob_padded_len(value.len());
        self.buffer.resize(self.buffer.len() + (padded - value.len()), 0);
    }

    /// Write an RGBA color element.
    pub fn write_color(&mut self, value: Color32) {
        self.buffer.extend_from_slice(value.as_bytes());
    }

    /// Write a MIDI message element.
    pub fn write_midi(&mut self, value: MidiMessage) {
        self.buffer.extend_from_slice(value.as_bytes());
    }

    /// Write an NTP timestamp element.
    pub fn write_timestamp(&mut self, value: NtpTimestamp) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Write an ascii character element, carried in the last byte of its
    /// 4-byte block.
    pub fn write_char(&mut self, value: char) {
        self.buffer.extend_from_slice(&[0, 0, 0, value as u8]);
    }

    /// Write the 8-byte `#bundle` tag that opens a bundle.
    pub fn write_bundle_prefix(&mut self) {
        self.buffer.extend_from_slice(&BUNDLE_TAG);
    }

    /// Copy the written bytes into `out` starting at `offset`.
    pub fn copy_to(&self, out: &mut [u8], offset: usize) -> usize {
        let end = offset + self.buffer.len();
        out[offset..end].copy_from_slice(&self.buffer);
        self.buffer.len()
    }
}
