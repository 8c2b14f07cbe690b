//! # OSC Network Layer
//!
//! ## Purpose
//!
//! Transport and dispatch on top of the `osc-codec` rules layer:
//! - [`OscServer`]: a UDP receiver with one dedicated blocking receive
//!   thread, exact/pattern handler routing, and a main-thread deferred
//!   callback queue drained by [`OscServer::update`]
//! - [`OscClient`]: a connected UDP sender owning a wire-format writer
//! - [`AddressSpace`]: the registration map behind the server, also usable
//!   standalone
//! - [`PortRegistry`]: explicit port → server ownership for host layers
//!
//! ## Threading Model
//!
//! All parsing and immediate-callback execution happens synchronously on
//! the server's receive thread, in datagram arrival order. Immediate
//! callbacks must not block: they stall every subsequent datagram. Deferred
//! callbacks run on whatever thread calls `update()`, once per tick.

pub mod client;
pub mod config;
pub mod error;
pub mod registry;
pub mod routing;
pub mod server;

pub use client::OscClient;
pub use config::{ClientConfig, ServerConfig};
pub use error::{NetworkError, NetworkResult};
pub use registry::PortRegistry;
pub use routing::{AddressSpace, DeferredFn, HandlerId, OscActionPair, ValueReadFn};
pub use server::{MonitorFn, MonitorId, OscServer};
