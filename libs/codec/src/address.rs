//! # Address Keys and Classification
//!
//! ## Purpose
//!
//! Exact-address handler lookup has to run against the raw bytes of a live
//! receive buffer, before anything has been decoded - allocating a string
//! per datagram would dominate the hot path. [`AddressKey`] is an owned,
//! content-hashed byte key whose `Borrow<[u8]>` impl lets a
//! `HashMap<AddressKey, _>` be probed with a borrowed `&[u8]` straight out
//! of the buffer: two keys (or a key and a probe slice) are equal iff their
//! byte contents are equal, regardless of where the bytes live.
//!
//! Also here: the classification that sorts a registration string into
//! exact **Address**, wildcard **Pattern**, or **Invalid**.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::constants::FORWARD_SLASH;

/// An owned OSC address usable as a hash-map key with zero-copy probes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressKey(Box<[u8]>);

impl AddressKey {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("")
    }
}

// Hash must agree with the `&[u8]` probe hash for Borrow-based lookup.
impl Hash for AddressKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.as_ref().hash(state)
    }
}

impl Borrow<[u8]> for AddressKey {
    #[inline]
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for AddressKey {
    fn from(address: &str) -> Self {
        Self(address.as_bytes().into())
    }
}

impl From<&[u8]> for AddressKey {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.into())
    }
}

impl fmt::Display for AddressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of registration string this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    /// Starts with '/', contains no reserved glob characters.
    Address,
    /// Starts with '/', uses glob characters (but never space, '#' or ',').
    Pattern,
    Invalid,
}

/// Characters reserved by the OSC address grammar. An exact address may
/// contain none of them; a pattern may use the glob subset.
const RESERVED: &[u8] = &[b' ', b'#', b'*', b',', b'?', b'[', b']', b'{', b'}'];

/// Glob characters permitted in patterns.
const GLOB: &[u8] = &[b'*', b'?', b'[', b']', b'{', b'}'];

/// Minimal validity for any address string: non-empty ascii starting
/// with '/'. Checked before pattern matching a concrete address.
pub fn is_valid_address(address: &str) -> bool {
    !address.is_empty() && address.is_ascii() && address.as_bytes()[0] == FORWARD_SLASH
}

/// Classify a registration string as exact address, wildcard pattern, or
/// invalid.
pub fn address_type(address: &str) -> AddressType {
    if !is_valid_address(address) {
        return AddressType::Invalid;
    }
    let mut has_glob = false;
    for &byte in address.as_bytes() {
        if RESERVED.contains(&byte) {
            if GLOB.contains(&byte) {
                has_glob = true;
            } else {
                // space, '#' and ',' are invalid everywhere
                return AddressType::Invalid;
            }
        }
    }
    if has_glob {
        AddressType::Pattern
    } else {
        AddressType::Address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn classification() {
        assert_eq!(address_type("/a/b"), AddressType::Address);
        assert_eq!(address_type("/a/*"), AddressType::Pattern);
        assert_eq!(address_type("/layer/?/clip"), AddressType::Pattern);
        assert_eq!(address_type("a/b"), AddressType::Invalid);
        assert_eq!(address_type("/a b"), AddressType::Invalid);
        assert_eq!(address_type("/a#b"), AddressType::Invalid);
        assert_eq!(address_type("/a,b"), AddressType::Invalid);
        assert_eq!(address_type(""), AddressType::Invalid);
        assert_eq!(address_type("/ä"), AddressType::Invalid);
    }

    #[test]
    fn map_probe_with_borrowed_buffer_bytes() {
        let mut map: HashMap<AddressKey, u32> = HashMap::new();
        map.insert(AddressKey::from("/composition/bpm"), 7);

        // simulate undecoded datagram bytes
        let datagram: &[u8] = b"/composition/bpm\0\0\0\0,f\0\0";
        let address = &datagram[..16];
        assert_eq!(map.get(address), Some(&7));
        assert_eq!(map.get(&datagram[..15]), None);
    }

    #[test]
    fn equality_is_content_based() {
        let a = AddressKey::from("/x");
        let b = AddressKey::from(&b"/x"[..]);
        assert_eq!(a, b);
    }
}
