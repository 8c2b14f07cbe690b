//! Protocol constants shared across the codec.

/// The 8-byte tag opening every OSC bundle: `#bundle` plus a NUL terminator.
pub const BUNDLE_TAG: [u8; 8] = *b"#bundle\0";

/// The bundle tag as one native-endian u64, so bundle detection is a single
/// integer compare against the first 8 buffer bytes instead of a byte loop.
pub const BUNDLE_TAG_U64: u64 = u64::from_ne_bytes(BUNDLE_TAG);

/// Every type-tag string starts with this byte.
pub const COMMA: u8 = b',';

/// Every OSC address starts with this byte.
pub const FORWARD_SLASH: u8 = b'/';

/// Default receive/send buffer capacity in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Maximum number of elements a single message may carry. Messages with more
/// supported tags than this fail to parse.
pub const MAX_ELEMENTS: usize = 32;

/// Upper bound on a single blob argument's declared length. Wire blob
/// lengths are otherwise attacker-controlled; 65507 is the largest payload a
/// UDP datagram can carry, so nothing legitimate exceeds it.
pub const MAX_BLOB_SIZE: usize = 65_507;

/// Maximum bundle nesting depth before further recursion is dropped.
pub const MAX_BUNDLE_DEPTH: usize = 8;

/// Round a string's byte length up to the 4-byte slot it occupies on the
/// wire. OSC strings are NUL-terminated and padded to a 4-byte boundary; a
/// length already on the boundary gains four full padding bytes so the
/// terminator always exists.
#[inline]
pub const fn string_slot_len(len: usize) -> usize {
    (len + 4) & !3
}

/// Round a blob's byte length up to a 4-byte boundary. Unlike strings, blobs
/// carry no terminator, so an aligned length gets no extra padding.
#[inline]
pub const fn blob_padded_len(len: usize) -> usize {
    (len + 3) & !3
}
