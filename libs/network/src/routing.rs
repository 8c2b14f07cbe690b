//! # Address Space - Handler Registration and Resolution
//!
//! ## Purpose
//!
//! Maps OSC addresses to handler chains two ways: an exact-address map
//! keyed by content-hashed [`AddressKey`]s (probed with raw buffer bytes,
//! no allocation), and an ordered wildcard-pattern list compiled once at
//! registration. A pattern match is memoized into the exact map bound to
//! the matched chain, so repeated datagrams at the same concrete address
//! resolve in O(1) and never rerun the pattern scan.
//!
//! ## Handler Chains
//!
//! Every registration is an [`OscActionPair`]: an immediate callback run on
//! the receive thread with the borrowed message view, plus an optional
//! deferred callback queued for the owner's `update()` tick. Registrations
//! at the same address form an ordered chain; removal takes the
//! [`HandlerId`] returned at registration and drops exactly that entry
//! without disturbing the others' relative order.
//!
//! Chains are shared (`Arc`) between the pattern list and any exact-map
//! entries memoized from it, so unregistering through the pattern is
//! observed immediately by cached concrete addresses.
//!
//! ## Pattern Grammar
//!
//! Patterns use the OSC 1.0 glob dialect - `*` and `?` match within one
//! path segment, `[...]`/`[!...]` are character classes - compiled into an
//! anchored regex. Regex metacharacters in the pattern text are matched
//! literally: `/a.b` matches only `/a.b`.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::RwLock;
use regex::Regex;
use tracing::debug;

use osc_codec::{address_type, is_valid_address, AddressKey, AddressType, MessageView};

use crate::error::{NetworkError, NetworkResult};

/// Immediate callback: runs on the receive thread while the datagram is
/// still in the buffer. Must not block.
pub type ValueReadFn = Box<dyn Fn(&MessageView<'_>) + Send + Sync>;

/// Deferred callback: queued per matching datagram, run by `update()`.
pub type DeferredFn = Arc<dyn Fn() + Send + Sync>;

/// One registration's pair of callbacks.
pub struct OscActionPair {
    value_read: ValueReadFn,
    deferred: Option<DeferredFn>,
}

impl OscActionPair {
    /// A pair with only an immediate value-read callback.
    pub fn new(value_read: impl Fn(&MessageView<'_>) + Send + Sync + 'static) -> Self {
        Self { value_read: Box::new(value_read), deferred: None }
    }

    /// A pair with both callbacks. The deferred callback has already lost
    /// access to the message by the time it runs - copy values out in the
    /// immediate callback.
    pub fn with_deferred(
        value_read: impl Fn(&MessageView<'_>) + Send + Sync + 'static,
        deferred: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self { value_read: Box::new(value_read), deferred: Some(Arc::new(deferred)) }
    }
}

/// Token identifying one registration, for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

struct Registration {
    id: HandlerId,
    pair: OscActionPair,
}

/// An ordered, shared chain of registrations at one address or pattern.
#[derive(Clone)]
pub struct HandlerChain(Arc<RwLock<Vec<Registration>>>);

impl HandlerChain {
    fn new() -> Self {
        Self(Arc::new(RwLock::new(Vec::new())))
    }

    fn push(&self, id: HandlerId, pair: OscActionPair) {
        self.0.write().push(Registration { id, pair });
    }

    fn remove(&self, id: HandlerId) -> bool {
        let mut entries = self.0.write();
        match entries.iter().position(|r| r.id == id) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Invoke every immediate callback in registration order and hand each
    /// registration's deferred callback to `on_deferred`.
    ///
    /// Runs under the chain's read lock: callbacks must not register or
    /// unregister handlers synchronously (deferred callbacks may).
    pub fn invoke(&self, view: &MessageView<'_>, mut on_deferred: impl FnMut(DeferredFn)) {
        for registration in self.0.read().iter() {
            (registration.pair.value_read)(view);
            if let Some(deferred) = &registration.pair.deferred {
                on_deferred(deferred.clone());
            }
        }
    }
}

struct PatternEntry {
    regex: Regex,
    chain: HandlerChain,
}

/// The exact-address map plus the ordered wildcard-pattern list.
#[derive(Default)]
pub struct AddressSpace {
    methods: HashMap<AddressKey, HandlerChain>,
    patterns: Vec<Option<PatternEntry>>,
    freed_pattern_slots: VecDeque<usize>,
    pattern_index: HashMap<String, usize>,
    pattern_count: usize,
    pattern_scans: u64,
    next_handler_id: u64,
}

impl AddressSpace {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> HandlerId {
        self.next_handler_id += 1;
        HandlerId(self.next_handler_id)
    }

    /// Register a handler pair at an exact address or a wildcard pattern.
    ///
    /// Registering the same address/pattern again appends to its existing
    /// chain; patterns are compiled exactly once.
    pub fn register(&mut self, address: &str, pair: OscActionPair) -> NetworkResult<HandlerId> {
        match address_type(address) {
            AddressType::Address => {
                let id = self.next_id();
                self.methods
                    .entry(AddressKey::from(address))
                    .or_insert_with(HandlerChain::new)
                    .push(id, pair);
                Ok(id)
            }
            AddressType::Pattern => {
                if let Some(&slot) = self.pattern_index.get(address) {
                    let id = self.next_id();
                    if let Some(entry) = &self.patterns[slot] {
                        entry.chain.push(id, pair);
                    }
                    return Ok(id);
                }
                let regex = compile_pattern(address).map_err(|source| {
                    NetworkError::InvalidPattern { pattern: address.to_owned(), source }
                })?;
                let id = self.next_id();
                let chain = HandlerChain::new();
                chain.push(id, pair);
                let entry = PatternEntry { regex, chain };
                let slot = match self.freed_pattern_slots.pop_front() {
                    Some(slot) => {
                        self.patterns[slot] = Some(entry);
                        slot
                    }
                    None => {
                        self.patterns.push(Some(entry));
                        self.patterns.len() - 1
                    }
                };
                self.pattern_index.insert(address.to_owned(), slot);
                self.pattern_count += 1;
                debug!(pattern = address, slot, "registered address pattern");
                Ok(id)
            }
            AddressType::Invalid => {
                Err(NetworkError::InvalidAddress { address: address.to_owned() })
            }
        }
    }

    /// Remove exactly one registration. Removing a chain's last entry frees
    /// the map entry (and its owned key), or clears the pattern slot and
    /// returns its index to the free list.
    pub fn unregister(&mut self, address: &str, id: HandlerId) -> bool {
        match address_type(address) {
            AddressType::Address => {
                let Some(chain) = self.methods.get(address.as_bytes()) else {
                    return false;
                };
                let removed = chain.remove(id);
                if removed && chain.is_empty() {
                    self.methods.remove(address.as_bytes());
                    self.purge_empty_memoized();
                }
                removed
            }
            AddressType::Pattern => {
                let Some(&slot) = self.pattern_index.get(address) else {
                    return false;
                };
                let Some(entry) = &self.patterns[slot] else {
                    return false;
                };
                let removed = entry.chain.remove(id);
                if removed && entry.chain.is_empty() {
                    self.patterns[slot] = None;
                    self.freed_pattern_slots.push_back(slot);
                    self.pattern_index.remove(address);
                    self.pattern_count -= 1;
                    // drop any exact entries memoized from this pattern
                    self.purge_empty_memoized();
                }
                removed
            }
            AddressType::Invalid => false,
        }
    }

    fn purge_empty_memoized(&mut self) {
        self.methods.retain(|_, chain| !chain.is_empty());
    }

    /// O(1) content-hash lookup straight against receive-buffer bytes.
    #[inline]
    pub fn resolve_exact(&self, address_bytes: &[u8]) -> Option<HandlerChain> {
        self.methods.get(address_bytes).cloned()
    }

    /// Linear scan over registered patterns in registration order; first
    /// match wins. A match is memoized into the exact map so subsequent
    /// datagrams at this concrete address skip the scan entirely.
    pub fn resolve_pattern(&mut self, address: &str) -> Option<HandlerChain> {
        if !is_valid_address(address) {
            return None;
        }
        self.pattern_scans += 1;
        let mut matched = None;
        for entry in self.patterns.iter().flatten() {
            if entry.regex.is_match(address) {
                matched = Some(entry.chain.clone());
                break;
            }
        }
        let chain = matched?;
        self.methods.entry(AddressKey::from(address)).or_insert_with(|| chain.clone());
        Some(chain)
    }

    /// Number of live wildcard patterns.
    #[inline]
    pub fn pattern_count(&self) -> usize {
        self.pattern_count
    }

    /// How many pattern scans have run. A probe for verifying match
    /// memoization: repeated datagrams at one concrete address should cost
    /// exactly one scan.
    pub fn pattern_scans(&self) -> u64 {
        self.pattern_scans
    }

    /// Number of entries in the exact map, memoized ones included.
    pub fn exact_address_count(&self) -> usize {
        self.methods.len()
    }
}

/// Compile an OSC 1.0 address pattern into an anchored regex: `*`/`?`
/// match within one path segment, `[!...]` negates a class, `{a,b}`
/// alternates, and every regex metacharacter in the pattern text is
/// escaped so it matches literally.
fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push('^');
    let mut in_class = false;
    let mut class_opened = false;
    let mut brace_depth = 0usize;
    for ch in pattern.chars() {
        if class_opened {
            class_opened = false;
            if ch == '!' {
                re.push('^');
                continue;
            }
        }
        match ch {
            '*' if !in_class => re.push_str("[^/]*"),
            '?' if !in_class => re.push_str("[^/]"),
            '[' if !in_class => {
                in_class = true;
                class_opened = true;
                re.push('[');
            }
            ']' if in_class => {
                in_class = false;
                re.push(']');
            }
            '{' if !in_class => {
                brace_depth += 1;
                re.push_str("(?:");
            }
            '}' if !in_class && brace_depth > 0 => {
                brace_depth -= 1;
                re.push(')');
            }
            ',' if brace_depth > 0 && !in_class => re.push('|'),
            '.' | '+' | '(' | ')' | '|' | '^' | '$' | '\\' | '*' | '?' | '{' | '}' => {
                re.push('\\');
                re.push(ch);
            }
            _ => re.push(ch),
        }
    }
    re.push('$');
    Regex::new(&re)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use osc_codec::{parse_message, MessageScratch, OscWriter};

    fn datagram(address: &str, value: f32) -> Vec<u8> {
        let mut writer = OscWriter::new();
        writer.begin_message(address, ",f");
        writer.write_float32(value);
        writer.as_slice().to_vec()
    }

    fn dispatch(space: &mut AddressSpace, buf: &[u8]) -> usize {
        let mut scratch = MessageScratch::new();
        let span = parse_message(buf, 0, buf.len(), &mut scratch).unwrap();
        let address_bytes = span.slice(buf);
        let chain = space.resolve_exact(address_bytes).or_else(|| {
            let address = std::str::from_utf8(address_bytes).unwrap();
            space.resolve_pattern(address)
        });
        let mut deferred = 0;
        if let Some(chain) = chain {
            chain.invoke(&scratch.view(buf), |_| deferred += 1);
        }
        deferred
    }

    fn counting_pair(counter: Arc<AtomicUsize>) -> OscActionPair {
        OscActionPair::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn invalid_registrations_are_rejected() {
        let mut space = AddressSpace::new();
        assert!(space.register("no/slash", OscActionPair::new(|_| {})).is_err());
        assert!(space.register("/has space", OscActionPair::new(|_| {})).is_err());
    }

    #[test]
    fn exact_match_takes_precedence_over_pattern() {
        let mut space = AddressSpace::new();
        let exact_hits = Arc::new(AtomicUsize::new(0));
        let pattern_hits = Arc::new(AtomicUsize::new(0));
        space.register("/foo/1", counting_pair(exact_hits.clone())).unwrap();
        space.register("/foo/*", counting_pair(pattern_hits.clone())).unwrap();

        dispatch(&mut space, &datagram("/foo/1", 1.0));
        assert_eq!(exact_hits.load(Ordering::SeqCst), 1);
        assert_eq!(pattern_hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn pattern_match_is_memoized() {
        let mut space = AddressSpace::new();
        let hits = Arc::new(AtomicUsize::new(0));
        space.register("/foo/*", counting_pair(hits.clone())).unwrap();

        dispatch(&mut space, &datagram("/foo/1", 1.0));
        dispatch(&mut space, &datagram("/foo/1", 2.0));
        dispatch(&mut space, &datagram("/foo/1", 3.0));

        assert_eq!(hits.load(Ordering::SeqCst), 3);
        // the scan ran exactly once; later datagrams hit the exact map
        assert_eq!(space.pattern_scans(), 1);
        assert_eq!(space.exact_address_count(), 1);
    }

    #[test]
    fn duplicate_registration_appends_not_duplicates() {
        let mut space = AddressSpace::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        space.register("/a", counting_pair(first.clone())).unwrap();
        space.register("/a", counting_pair(second.clone())).unwrap();
        assert_eq!(space.exact_address_count(), 1);

        dispatch(&mut space, &datagram("/a", 0.0));
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unregister_removes_exactly_one_and_preserves_order() {
        let mut space = AddressSpace::new();
        let order = Arc::new(RwLock::new(Vec::new()));
        let mut ids = Vec::new();
        for label in ["a", "b", "c"] {
            let order = order.clone();
            ids.push(
                space
                    .register(
                        "/chain",
                        OscActionPair::new(move |_| order.write().push(label)),
                    )
                    .unwrap(),
            );
        }
        assert!(space.unregister("/chain", ids[1]));
        assert!(!space.unregister("/chain", ids[1]));

        dispatch(&mut space, &datagram("/chain", 0.0));
        assert_eq!(&*order.read(), &["a", "c"]);
    }

    #[test]
    fn last_removal_frees_the_entry() {
        let mut space = AddressSpace::new();
        let id = space.register("/solo", OscActionPair::new(|_| {})).unwrap();
        assert_eq!(space.exact_address_count(), 1);
        assert!(space.unregister("/solo", id));
        assert_eq!(space.exact_address_count(), 0);

        let pattern_id = space.register("/p/*", OscActionPair::new(|_| {})).unwrap();
        assert_eq!(space.pattern_count(), 1);
        assert!(space.unregister("/p/*", pattern_id));
        assert_eq!(space.pattern_count(), 0);
    }

    #[test]
    fn freed_pattern_slots_are_reused() {
        let mut space = AddressSpace::new();
        let a = space.register("/a/*", OscActionPair::new(|_| {})).unwrap();
        space.register("/b/*", OscActionPair::new(|_| {})).unwrap();
        space.unregister("/a/*", a);
        space.register("/c/*", OscActionPair::new(|_| {})).unwrap();
        assert_eq!(space.pattern_count(), 2);
        assert_eq!(space.patterns.len(), 2);
    }

    #[test]
    fn unregistering_a_pattern_disables_its_memoized_addresses() {
        let mut space = AddressSpace::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let id = space.register("/foo/*", counting_pair(hits.clone())).unwrap();

        dispatch(&mut space, &datagram("/foo/9", 0.0));
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        space.unregister("/foo/*", id);
        dispatch(&mut space, &datagram("/foo/9", 0.0));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(space.exact_address_count(), 0);
    }

    #[test]
    fn glob_semantics_not_regex_semantics() {
        let mut space = AddressSpace::new();
        space.register("/a.b/*", OscActionPair::new(|_| {})).unwrap();
        // '.' is literal: /aXb must not match
        assert!(space.resolve_pattern("/a.b/1").is_some());
        assert!(space.resolve_pattern("/aXb/1").is_none());
        // '*' stays within one path segment
        assert!(space.resolve_pattern("/a.b/1/2").is_none());
    }

    #[test]
    fn character_classes_and_negation() {
        let mut space = AddressSpace::new();
        space.register("/pad/[0-3]", OscActionPair::new(|_| {})).unwrap();
        assert!(space.resolve_pattern("/pad/2").is_some());
        assert!(space.resolve_pattern("/pad/7").is_none());

        space.register("/key/[!q]", OscActionPair::new(|_| {})).unwrap();
        assert!(space.resolve_pattern("/key/a").is_some());
        assert!(space.resolve_pattern("/key/q").is_none());
    }

    #[test]
    fn question_mark_matches_single_character() {
        let mut space = AddressSpace::new();
        space.register("/x/?", OscActionPair::new(|_| {})).unwrap();
        assert!(space.resolve_pattern("/x/1").is_some());
        assert!(space.resolve_pattern("/x/12").is_none());
        assert!(space.resolve_pattern("/x/").is_none());
    }
}
