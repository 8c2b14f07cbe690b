//! # OSC Server - Receive Loop and Dispatch
//!
//! ## Purpose
//!
//! Owns the UDP socket, the single reusable receive buffer, and the
//! background thread that blocks on `recv` and dispatches every datagram:
//! bundle detection, exact-address resolution straight from buffer bytes,
//! pattern resolution with per-byte-length string buffer reuse, immediate
//! callback invocation, and deferred-callback queueing.
//!
//! ## Lifecycle
//!
//! ```text
//! Created --start()--> Started {Running <--pause()/resume()--> Paused} --dispose()--> Disposed
//! ```
//!
//! `start` binds the socket and launches the receive loop exactly once;
//! repeat calls are no-ops. `pause` keeps the socket and thread alive but
//! drops incoming datagrams at the top of each loop iteration; `resume`
//! re-enables dispatch. `dispose` is idempotent, also runs on `Drop`, and
//! joins the thread - the blocking receive observes the request within one
//! receive timeout.
//!
//! ## Error Policy
//!
//! Malformed datagrams are dropped per message (or per bundle element) and
//! the loop continues. Receive timeouts are the loop's heartbeat and are
//! ignored. Anything else - including a panicking handler - is logged and
//! terminates the loop, leaving the server non-functional until recreated.

use std::collections::HashMap;
use std::net::UdpSocket;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, trace};

use osc_codec::{is_bundle, parse_message, walk_bundle, AddressSpan, MessageScratch, MessageView};

use crate::config::ServerConfig;
use crate::error::{NetworkError, NetworkResult};
use crate::routing::{AddressSpace, DeferredFn, HandlerId, OscActionPair};

/// Development-time hook observing every parsed inbound message, resolved
/// or not, with its address bytes and decoded view. Allocation-sensitive;
/// intended for tooling, not production dispatch.
pub type MonitorFn = Box<dyn Fn(&[u8], &MessageView<'_>) + Send + Sync>;

/// Token identifying one monitor registration, for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonitorId(u64);

struct ServerShared {
    address_space: RwLock<AddressSpace>,
    /// Appended by the receive thread, drained by `update()`. Exactly one
    /// producer and one consumer.
    pending: Mutex<Vec<DeferredFn>>,
    monitors: RwLock<Vec<(MonitorId, MonitorFn)>>,
    next_monitor_id: AtomicU64,
    paused: AtomicBool,
    disposed: AtomicBool,
}

/// A UDP OSC receiver with a dedicated blocking receive thread.
pub struct OscServer {
    config: ServerConfig,
    shared: Arc<ServerShared>,
    socket: Option<UdpSocket>,
    thread: Option<JoinHandle<()>>,
    started: bool,
    /// Main-thread side of the deferred queue's storage ping-pong.
    drain: Vec<DeferredFn>,
}

impl OscServer {
    /// Create a server. No socket is bound until [`OscServer::start`].
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            shared: Arc::new(ServerShared {
                address_space: RwLock::new(AddressSpace::new()),
                pending: Mutex::new(Vec::new()),
                monitors: RwLock::new(Vec::new()),
                next_monitor_id: AtomicU64::new(0),
                paused: AtomicBool::new(false),
                disposed: AtomicBool::new(false),
            }),
            socket: None,
            thread: None,
            started: false,
            drain: Vec::new(),
        }
    }

    /// Shorthand for a default-configured server on `port`.
    pub fn on_port(port: u16) -> Self {
        Self::new(ServerConfig::with_port(port))
    }

    /// Bind the socket and launch the receive loop. Idempotent: calls after
    /// the first do nothing.
    pub fn start(&mut self) -> NetworkResult<()> {
        if self.shared.disposed.load(Ordering::Acquire) {
            return Err(NetworkError::Disposed);
        }
        if self.started {
            return Ok(());
        }

        let port = self.config.port;
        let socket = UdpSocket::bind(("0.0.0.0", port))
            .map_err(|source| NetworkError::Bind { port, source })?;
        socket
            .set_read_timeout(Some(self.config.receive_timeout()))
            .map_err(|source| NetworkError::Bind { port, source })?;
        let loop_socket =
            socket.try_clone().map_err(|source| NetworkError::Bind { port, source })?;

        let shared = self.shared.clone();
        let buffer_size = self.config.buffer_size;
        let thread = std::thread::Builder::new()
            .name(format!("osc-recv-{port}"))
            .spawn(move || serve(loop_socket, shared, buffer_size))
            .map_err(|source| NetworkError::Thread { source })?;

        self.socket = Some(socket);
        self.thread = Some(thread);
        self.started = true;
        debug!(port = self.local_port().unwrap_or(port), "osc server started");
        Ok(())
    }

    /// The port actually bound, once started. Differs from the configured
    /// port when that was 0 (ephemeral).
    pub fn local_port(&self) -> Option<u16> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok()).map(|a| a.port())
    }

    /// The configured port.
    pub fn port(&self) -> u16 {
        self.config.port
    }

    /// Stop servicing datagrams without tearing down the socket or thread.
    pub fn pause(&self) {
        self.shared.paused.store(true, Ordering::Release);
        debug!("osc server paused");
    }

    /// Re-enable dispatch after [`OscServer::pause`].
    pub fn resume(&self) {
        self.shared.paused.store(false, Ordering::Release);
        debug!("osc server resumed");
    }

    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::Acquire)
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.disposed.load(Ordering::Acquire)
    }

    /// Register a handler pair at an exact address or wildcard pattern.
    pub fn register(&self, address: &str, pair: OscActionPair) -> NetworkResult<HandlerId> {
        self.shared.address_space.write().register(address, pair)
    }

    /// Remove exactly one registration by its id.
    pub fn unregister(&self, address: &str, id: HandlerId) -> bool {
        self.shared.address_space.write().unregister(address, id)
    }

    /// Add a monitor callback observing every inbound message. Monitors
    /// force address decoding per datagram; use while developing only.
    pub fn add_monitor(
        &self,
        monitor: impl Fn(&[u8], &MessageView<'_>) + Send + Sync + 'static,
    ) -> MonitorId {
        let id = MonitorId(self.shared.next_monitor_id.fetch_add(1, Ordering::Relaxed));
        self.shared.monitors.write().push((id, Box::new(monitor)));
        id
    }

    /// Remove a monitor callback.
    pub fn remove_monitor(&self, id: MonitorId) -> bool {
        let mut monitors = self.shared.monitors.write();
        match monitors.iter().position(|(m, _)| *m == id) {
            Some(index) => {
                monitors.remove(index);
                true
            }
            None => false,
        }
    }

    /// Run queued deferred callbacks, front to back, in the order the
    /// receive thread appended them. Call once per host tick from a single
    /// thread. Returns how many callbacks ran.
    pub fn update(&mut self) -> usize {
        {
            let mut pending = self.shared.pending.lock();
            std::mem::swap(&mut *pending, &mut self.drain);
        }
        let count = self.drain.len();
        for callback in self.drain.drain(..) {
            callback();
        }
        count
    }

    /// Shut down: stop the loop, join the thread, release the socket.
    /// Idempotent and safe to call from `Drop`.
    pub fn dispose(&mut self) {
        if self.shared.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("osc receive thread terminated by panic");
            }
        }
        self.socket = None;
        debug!("osc server disposed");
    }
}

impl Drop for OscServer {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// The receive loop: one blocking `recv` per iteration into the single
/// reusable buffer, then synchronous dispatch on this thread. Processing
/// order equals receipt order.
fn serve(socket: UdpSocket, shared: Arc<ServerShared>, buffer_size: usize) {
    let mut buffer = vec![0u8; buffer_size];
    let mut scratch = MessageScratch::new();
    let mut string_buffers: HashMap<usize, String> = HashMap::new();

    while !shared.disposed.load(Ordering::Acquire) {
        match socket.recv(&mut buffer) {
            Ok(0) => continue,
            Ok(received) => {
                if shared.paused.load(Ordering::Acquire) {
                    continue;
                }
                let result = catch_unwind(AssertUnwindSafe(|| {
                    dispatch_datagram(&shared, &buffer, received, &mut scratch, &mut string_buffers)
                }));
                if result.is_err() {
                    error!("handler panicked; stopping osc receive loop");
                    break;
                }
            }
            Err(err)
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                // receive timeout: the loop's chance to observe pause/dispose
                continue;
            }
            Err(err) => {
                if !shared.disposed.load(Ordering::Acquire) {
                    error!(%err, "osc receive failed; stopping receive loop");
                }
                break;
            }
        }
    }
}

fn dispatch_datagram(
    shared: &ServerShared,
    buffer: &[u8],
    received: usize,
    scratch: &mut MessageScratch,
    string_buffers: &mut HashMap<usize, String>,
) {
    if is_bundle(&buffer[..received]) {
        // the bundle time tag is not scheduled; contained messages dispatch
        // immediately in contained order
        walk_bundle(buffer, received, scratch, &mut |span, scratch| {
            route_message(shared, buffer, received, span, scratch, string_buffers);
        });
    } else {
        match parse_message(buffer, 0, received, scratch) {
            Ok(span) => route_message(shared, buffer, received, span, scratch, string_buffers),
            Err(err) => trace!(%err, received, "dropping unparseable datagram"),
        }
    }
}

fn route_message(
    shared: &ServerShared,
    buffer: &[u8],
    received: usize,
    span: AddressSpan,
    scratch: &MessageScratch,
    string_buffers: &mut HashMap<usize, String>,
) {
    let address_bytes = span.slice(buffer);

    let chain = shared.address_space.read().resolve_exact(address_bytes);
    let chain = match chain {
        Some(chain) => Some(chain),
        // no handler at this exact address; a registered pattern may match it
        None if shared.address_space.read().pattern_count() > 0 => {
            let address = reuse_address_string(string_buffers, address_bytes);
            shared.address_space.write().resolve_pattern(address)
        }
        None => None,
    };

    let view = scratch.view(&buffer[..received]);
    if let Some(chain) = chain {
        chain.invoke(&view, |deferred| shared.pending.lock().push(deferred));
    }

    let monitors = shared.monitors.read();
    for (_, monitor) in monitors.iter() {
        monitor(address_bytes, &view);
    }
}

/// Materialize address bytes as `&str` by overwriting a reusable buffer of
/// the same length in place, so repeat-length addresses cost no fresh
/// allocation.
fn reuse_address_string<'a>(
    string_buffers: &'a mut HashMap<usize, String>,
    address_bytes: &[u8],
) -> &'a str {
    let slot = string_buffers
        .entry(address_bytes.len())
        .or_insert_with(|| String::with_capacity(address_bytes.len()));
    slot.clear();
    slot.push_str(std::str::from_utf8(address_bytes).unwrap_or(""));
    slot
}
