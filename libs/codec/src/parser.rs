//! # OSC Message Parser
//!
//! ## Purpose
//!
//! Zero-copy parsing of OSC 1.0 datagrams: bundle detection with a single
//! integer compare, address and type-tag scanning, and the per-element
//! offset walk that turns a raw buffer into an indexable message. Parsing
//! writes into a caller-owned [`MessageScratch`] that is allocated once per
//! server and overwritten on every datagram - the parser itself never
//! touches the heap.
//!
//! ## Failure Model
//!
//! Malformed input is an expected, routine condition on an open UDP port.
//! Every failure is a returned [`CodecError`], never a panic; inside a
//! bundle, an element that fails to parse is skipped and the walk continues
//! with the next element.
//!
//! ## Alignment
//!
//! Addresses and type-tag strings are NUL-terminated and padded to 4-byte
//! boundaries; a string whose length is already a multiple of 4 gains four
//! full padding bytes so the terminator always exists. All alignment is
//! computed from absolute buffer offsets, including for messages embedded
//! in bundles.

use tracing::trace;

use osc_types::{NtpTimestamp, TypeTag, WireSize};

use crate::constants::{
    blob_padded_len, BUNDLE_TAG_U64, COMMA, FORWARD_SLASH, MAX_BLOB_SIZE, MAX_BUNDLE_DEPTH,
    MAX_ELEMENTS,
};
use crate::error::{CodecError, CodecResult};
use crate::view::MessageView;

/// The byte range an address occupies within a receive buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressSpan {
    pub start: usize,
    pub len: usize,
}

impl AddressSpan {
    /// The address bytes, excluding the NUL terminator.
    #[inline]
    pub fn slice<'b>(&self, buf: &'b [u8]) -> &'b [u8] {
        &buf[self.start..self.start + self.len]
    }
}

/// Per-message parse results: parallel `(tag, offset)` arrays plus the
/// element count, with fixed capacity [`MAX_ELEMENTS`].
///
/// One instance lives for a server's whole lifetime and is overwritten on
/// every parse. Entries at index >= `element_count` are stale garbage from
/// previous datagrams and must never be read; the accessors on
/// [`MessageView`] enforce that bound.
#[derive(Debug, Clone)]
pub struct MessageScratch {
    tags: [TypeTag; MAX_ELEMENTS],
    offsets: [u32; MAX_ELEMENTS],
    element_count: usize,
}

impl Default for MessageScratch {
    fn default() -> Self {
        Self {
            tags: [TypeTag::Nil; MAX_ELEMENTS],
            offsets: [0; MAX_ELEMENTS],
            element_count: 0,
        }
    }
}

impl MessageScratch {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    /// The tag of element `index`, if it exists.
    #[inline]
    pub fn tag(&self, index: usize) -> Option<TypeTag> {
        (index < self.element_count).then(|| self.tags[index])
    }

    /// Borrow this scratch together with the buffer it indexes into as a
    /// typed message view. The view is only valid while `buf` still holds
    /// the datagram these offsets were computed from.
    #[inline]
    pub fn view<'b>(&'b self, buf: &'b [u8]) -> MessageView<'b> {
        MessageView::new(buf, &self.tags[..self.element_count], &self.offsets[..self.element_count])
    }

    #[inline]
    fn clear(&mut self) {
        self.element_count = 0;
    }
}

/// Round an absolute terminator position up to the offset where the next
/// wire field begins. Positions already on a boundary advance a full 4
/// bytes - that is where OSC's mandatory padding rule lives.
#[inline]
const fn next_aligned(pos: usize) -> usize {
    (pos + 4) & !3
}

#[inline]
fn be_bytes4(buf: &[u8], offset: usize) -> [u8; 4] {
    [buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]]
}

#[inline]
fn tag_u64_at(buf: &[u8], pos: usize) -> Option<u64> {
    let bytes: [u8; 8] = buf.get(pos..pos + 8)?.try_into().ok()?;
    Some(u64::from_ne_bytes(bytes))
}

/// True if the datagram opens with the 8-byte `#bundle` tag, checked as one
/// 64-bit compare.
#[inline]
pub fn is_bundle(buf: &[u8]) -> bool {
    is_bundle_at(buf, 0)
}

#[inline]
fn is_bundle_at(buf: &[u8], pos: usize) -> bool {
    tag_u64_at(buf, pos) == Some(BUNDLE_TAG_U64)
}

/// The NTP time tag carried in a bundle header (bytes 8..16).
pub fn bundle_timestamp(buf: &[u8]) -> Option<NtpTimestamp> {
    let bytes: [u8; 8] = buf.get(8..16)?.try_into().ok()?;
    Some(NtpTimestamp::from_be_bytes(bytes))
}

/// Scan the address string beginning at `start`: the first byte must be
/// '/', and the string must be NUL-terminated before `received`. Returns
/// the address length, excluding the terminator.
fn find_address_length(buf: &[u8], start: usize, received: usize) -> CodecResult<usize> {
    if start >= received {
        return Err(CodecError::EmptyPacket);
    }
    if buf[start] != FORWARD_SLASH {
        return Err(CodecError::NotAnAddress { offset: start, byte: buf[start] });
    }
    match buf[start..received].iter().position(|&b| b == 0) {
        Some(len) => Ok(len),
        None => Err(CodecError::UnterminatedAddress { offset: start }),
    }
}

/// Scan type-tag bytes after the opening ',' until the first unsupported
/// byte, recording each tag into the scratch table. A tag string with zero
/// supported tags fails the whole message.
fn scan_tags(
    buf: &[u8],
    tag_start: usize,
    received: usize,
    scratch: &mut MessageScratch,
) -> CodecResult<usize> {
    scratch.clear();
    let mut index = tag_start + 1; // skip the ','
    while index < received {
        let Some(tag) = TypeTag::from_byte(buf[index]) else {
            break;
        };
        if scratch.element_count == MAX_ELEMENTS {
            return Err(CodecError::TooManyElements { max: MAX_ELEMENTS });
        }
        scratch.tags[scratch.element_count] = tag;
        scratch.element_count += 1;
        index += 1;
    }
    if scratch.element_count == 0 {
        return Err(CodecError::EmptyTypeTags { offset: tag_start });
    }
    Ok(scratch.element_count)
}

/// Walk the recorded tags in order, computing each element's payload start
/// offset and bounds-checking every advance against the received length.
fn find_offsets(
    buf: &[u8],
    first_arg: usize,
    received: usize,
    scratch: &mut MessageScratch,
) -> CodecResult<()> {
    let mut pos = first_arg;
    for i in 0..scratch.element_count {
        scratch.offsets[i] = pos as u32;
        match scratch.tags[i].wire_size() {
            WireSize::Fixed(size) => {
                pos += size;
                if pos > received {
                    return Err(CodecError::Truncated { need: pos, got: received });
                }
            }
            WireSize::Empty => {}
            WireSize::String => {
                let nul = buf[pos..received]
                    .iter()
                    .position(|&b| b == 0)
                    .ok_or(CodecError::UnterminatedString { offset: pos })?;
                pos = next_aligned(pos + nul);
            }
            WireSize::Blob => {
                if pos + 4 > received {
                    return Err(CodecError::Truncated { need: pos + 4, got: received });
                }
                let length = i32::from_be_bytes(be_bytes4(buf, pos));
                if length < 0 || length as usize > MAX_BLOB_SIZE {
                    return Err(CodecError::BlobTooLarge {
                        length: i64::from(length),
                        offset: pos,
                        limit: MAX_BLOB_SIZE,
                    });
                }
                let length = length as usize;
                let need = pos + 4 + length;
                if need > received {
                    return Err(CodecError::Truncated { need, got: received });
                }
                pos += 4 + blob_padded_len(length);
            }
        }
    }
    Ok(())
}

/// Parse one plain (non-bundle) message beginning at `start`, filling
/// `scratch` with its element table. Returns the address byte range on
/// success.
///
/// `received` is the exclusive end of valid bytes - the datagram's received
/// byte count for top-level messages, or the element boundary inside a
/// bundle.
pub fn parse_message(
    buf: &[u8],
    start: usize,
    received: usize,
    scratch: &mut MessageScratch,
) -> CodecResult<AddressSpan> {
    let addr_len = find_address_length(buf, start, received)?;
    let tag_start = next_aligned(start + addr_len);
    if tag_start >= received {
        return Err(CodecError::Truncated { need: tag_start + 1, got: received });
    }
    if buf[tag_start] != COMMA {
        return Err(CodecError::MissingTypeTags { offset: tag_start, byte: buf[tag_start] });
    }
    let tag_count = scan_tags(buf, tag_start, received, scratch)?;
    let first_arg = next_aligned(tag_start + 1 + tag_count);
    find_offsets(buf, first_arg, received, scratch)?;
    Ok(AddressSpan { start, len: addr_len })
}

/// Walk every message inside a bundle, recursing into nested bundles, and
/// invoke `on_message` once per successfully parsed message in contained
/// order.
///
/// Elements that fail to parse are skipped, not fatal: one bad element in a
/// bundle must not drop its siblings. The caller has already established
/// that `buf` opens with the bundle tag (see [`is_bundle`]).
pub fn walk_bundle<F>(buf: &[u8], received: usize, scratch: &mut MessageScratch, on_message: &mut F)
where
    F: FnMut(AddressSpan, &MessageScratch),
{
    // 8-byte bundle tag + 8-byte time tag
    walk_bundle_elements(buf, 16, received, 0, scratch, on_message);
}

fn walk_bundle_elements<F>(
    buf: &[u8],
    mut offset: usize,
    end: usize,
    depth: usize,
    scratch: &mut MessageScratch,
    on_message: &mut F,
) where
    F: FnMut(AddressSpan, &MessageScratch),
{
    while offset + 4 <= end {
        let size = i32::from_be_bytes(be_bytes4(buf, offset));
        if size < 0 {
            trace!(offset, size, "negative bundle element size, abandoning bundle");
            break;
        }
        let content = offset + 4;
        let content_end = content.saturating_add(size as usize).min(end);
        if content < content_end {
            if is_bundle_at(buf, content) && content_end - content >= 16 {
                if depth + 1 < MAX_BUNDLE_DEPTH {
                    walk_bundle_elements(
                        buf,
                        content + 16,
                        content_end,
                        depth + 1,
                        scratch,
                        on_message,
                    );
                } else {
                    trace!(offset = content, depth, "bundle nested too deep, dropping element");
                }
            } else {
                match parse_message(buf, content, content_end, scratch) {
                    Ok(span) => on_message(span, scratch),
                    Err(err) => {
                        trace!(%err, offset = content, "skipping unparseable bundle element");
                    }
                }
            }
        }
        offset = content + size as usize;
    }
}
