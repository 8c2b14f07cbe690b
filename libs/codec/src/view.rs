//! # Decoded Message View
//!
//! Typed accessors over a parsed message. A [`MessageView`] borrows the
//! receive buffer and the element table for the duration of one immediate
//! callback - it cannot outlive the datagram it indexes, which is exactly
//! the contract the receive loop needs: the next datagram overwrites the
//! buffer in place. Deferred work must copy values out before returning.
//!
//! Every checked accessor treats a bad index or a tag mismatch as a
//! recoverable condition and returns the type's zero value; a handful of
//! documented fallback conversions apply where a sender's numeric type
//! differs from the reader's (an int32 read as float still yields its
//! value). The `_unchecked` siblings skip the tag dispatch for hot-path
//! callers that already know the element's tag.
//!
//! All multi-byte reads byte-swap from network order (big-endian).

use osc_types::{Color32, MidiMessage, NtpTimestamp, TypeTag};
use zerocopy::FromBytes;

/// A borrowed, typed window onto one parsed message.
#[derive(Clone, Copy)]
pub struct MessageView<'buf> {
    buf: &'buf [u8],
    tags: &'buf [TypeTag],
    offsets: &'buf [u32],
}

#[inline]
fn be_bytes4(buf: &[u8], offset: usize) -> [u8; 4] {
    [buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]]
}

#[inline]
fn be_bytes8(buf: &[u8], offset: usize) -> [u8; 8] {
    [
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
        buf[offset + 4],
        buf[offset + 5],
        buf[offset + 6],
        buf[offset + 7],
    ]
}

impl<'buf> MessageView<'buf> {
    pub(crate) fn new(buf: &'buf [u8], tags: &'buf [TypeTag], offsets: &'buf [u32]) -> Self {
        Self { buf, tags, offsets }
    }

    /// The number of elements in the message.
    #[inline]
    pub fn element_count(&self) -> usize {
        self.tags.len()
    }

    /// The tag of element `index`, if it exists.
    #[inline]
    pub fn tag(&self, index: usize) -> Option<TypeTag> {
        self.tags.get(index).copied()
    }

    /// Run `f` once per element with its index and tag, in element order.
    pub fn for_each_element<F: FnMut(usize, TypeTag)>(&self, mut f: F) {
        for (i, &tag) in self.tags.iter().enumerate() {
            f(i, tag);
        }
    }

    #[inline]
    fn offset(&self, index: usize) -> usize {
        self.offsets[index] as usize
    }

    /// Read a 32-bit integer element. Falls back to casting a float32
    /// element's value; anything else reads as 0.
    pub fn read_int32(&self, index: usize) -> i32 {
        match self.tag(index) {
            Some(TypeTag::Int32) => self.read_int32_unchecked(index),
            Some(TypeTag::Float32) => self.read_float32_unchecked(index) as i32,
            _ => 0,
        }
    }

    /// Read a 32-bit integer with no tag check. The caller must already
    /// know `index` holds an int32.
    #[inline]
    pub fn read_int32_unchecked(&self, index: usize) -> i32 {
        i32::from_be_bytes(be_bytes4(self.buf, self.offset(index)))
    }

    /// Read a 64-bit integer element. Falls back to widening an int32.
    pub fn read_int64(&self, index: usize) -> i64 {
        match self.tag(index) {
            Some(TypeTag::Int64) => self.read_int64_unchecked(index),
            Some(TypeTag::Int32) => i64::from(self.read_int32_unchecked(index)),
            _ => 0,
        }
    }

    #[inline]
    pub fn read_int64_unchecked(&self, index: usize) -> i64 {
        i64::from_be_bytes(be_bytes8(self.buf, self.offset(index)))
    }

    /// Read a 32-bit float element. Falls back to casting an int32
    /// element's value; anything else reads as 0.0.
    pub fn read_float32(&self, index: usize) -> f32 {
        match self.tag(index) {
            Some(TypeTag::Float32) => self.read_float32_unchecked(index),
            Some(TypeTag::Int32) => self.read_int32_unchecked(index) as f32,
            _ => 0.0,
        }
    }

    #[inline]
    pub fn read_float32_unchecked(&self, index: usize) -> f32 {
        f32::from_be_bytes(be_bytes4(self.buf, self.offset(index)))
    }

    /// Read a 64-bit float element. Widens float32/int32/int64 values.
    pub fn read_float64(&self, index: usize) -> f64 {
        match self.tag(index) {
            Some(TypeTag::Float64) => self.read_float64_unchecked(index),
            Some(TypeTag::Float32) => f64::from(self.read_float32_unchecked(index)),
            Some(TypeTag::Int32) => f64::from(self.read_int32_unchecked(index)),
            Some(TypeTag::Int64) => self.read_int64_unchecked(index) as f64,
            _ => 0.0,
        }
    }

    #[inline]
    pub fn read_float64_unchecked(&self, index: usize) -> f64 {
        f64::from_be_bytes(be_bytes8(self.buf, self.offset(index)))
    }

    /// Read a boolean element. `T`/`F` carry the value in the tag itself;
    /// an int32 element reads as its non-zero-ness.
    pub fn read_bool(&self, index: usize) -> bool {
        match self.tag(index) {
            Some(TypeTag::True) => true,
            Some(TypeTag::False) => false,
            Some(TypeTag::Int32) => self.read_int32_unchecked(index) != 0,
            _ => false,
        }
    }

    /// Read an ascii character element (carried in the last byte of its
    /// 4-byte block).
    pub fn read_char(&self, index: usize) -> char {
        match self.tag(index) {
            Some(TypeTag::AsciiChar) => self.read_char_unchecked(index),
            _ => '\0',
        }
    }

    #[inline]
    pub fn read_char_unchecked(&self, index: usize) -> char {
        self.buf[self.offset(index) + 3] as char
    }

    /// Read an RGBA color element.
    pub fn read_color(&self, index: usize) -> Color32 {
        match self.tag(index) {
            Some(TypeTag::Color) => self.read_color_unchecked(index),
            _ => Color32::default(),
        }
    }

    #[inline]
    pub fn read_color_unchecked(&self, index: usize) -> Color32 {
        let offset = self.offset(index);
        Color32::read_from(&self.buf[offset..offset + 4]).unwrap_or_default()
    }

    /// Read a MIDI message element.
    pub fn read_midi(&self, index: usize) -> MidiMessage {
        match self.tag(index) {
            Some(TypeTag::Midi) => self.read_midi_unchecked(index),
            _ => MidiMessage::default(),
        }
    }

    #[inline]
    pub fn read_midi_unchecked(&self, index: usize) -> MidiMessage {
        let offset = self.offset(index);
        MidiMessage::read_from(&self.buf[offset..offset + 4]).unwrap_or_default()
    }

    /// Read an NTP timestamp element.
    pub fn read_timestamp(&self, index: usize) -> NtpTimestamp {
        match self.tag(index) {
            Some(TypeTag::TimeTag) => self.read_timestamp_unchecked(index),
            _ => NtpTimestamp::default(),
        }
    }

    #[inline]
    pub fn read_timestamp_unchecked(&self, index: usize) -> NtpTimestamp {
        NtpTimestamp::from_be_bytes(be_bytes8(self.buf, self.offset(index)))
    }

    /// Read a string element without copying: the returned slice borrows
    /// the receive buffer and is only valid inside the immediate callback.
    /// Non-string tags (and non-ascii bytes) read as "".
    pub fn read_str(&self, index: usize) -> &'buf str {
        match self.tag(index) {
            Some(TypeTag::String | TypeTag::AltString) => self.read_str_unchecked(index),
            _ => "",
        }
    }

    #[inline]
    pub fn read_str_unchecked(&self, index: usize) -> &'buf str {
        let start = self.offset(index);
        let len = self.buf[start..].iter().position(|&b| b == 0).unwrap_or(0);
        std::str::from_utf8(&self.buf[start..start + len]).unwrap_or("")
    }

    /// Read a string element into an owned `String`, with the lenient
    /// numeric conversions tooling expects: numeric elements format as
    /// their decimal value.
    pub fn read_string(&self, index: usize) -> String {
        match self.tag(index) {
            Some(TypeTag::String | TypeTag::AltString) => self.read_str_unchecked(index).to_owned(),
            Some(TypeTag::Int32) => self.read_int32_unchecked(index).to_string(),
            Some(TypeTag::Int64) => self.read_int64_unchecked(index).to_string(),
            Some(TypeTag::Float32) => self.read_float32_unchecked(index).to_string(),
            Some(TypeTag::Float64) => self.read_float64_unchecked(index).to_string(),
            _ => String::new(),
        }
    }

    /// Borrow a blob element's payload without copying. Non-blob tags read
    /// as an empty slice.
    pub fn read_blob_slice(&self, index: usize) -> &'buf [u8] {
        match self.tag(index) {
            Some(TypeTag::Blob) => self.read_blob_slice_unchecked(index),
            _ => &[],
        }
    }

    #[inline]
    pub fn read_blob_slice_unchecked(&self, index: usize) -> &'buf [u8] {
        let offset = self.offset(index);
        let length = i32::from_be_bytes(be_bytes4(self.buf, offset)).max(0) as usize;
        &self.buf[offset + 4..offset + 4 + length]
    }

    /// Copy a blob element's payload into `out` (cleared first) and return
    /// the number of bytes copied.
    pub fn read_blob(&self, index: usize, out: &mut Vec<u8>) -> usize {
        out.clear();
        let payload = self.read_blob_slice(index);
        out.extend_from_slice(payload);
        payload.len()
    }
}
