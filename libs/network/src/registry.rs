//! Explicit port → server registry.
//!
//! Host-integration layers usually want one shared server per UDP port, no
//! matter how many of their components listen on it. This registry gives
//! that sharing a single owner with a visible lifetime instead of
//! process-wide static state: whoever holds the registry owns every server
//! in it.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::config::ServerConfig;
use crate::error::{NetworkError, NetworkResult};
use crate::server::OscServer;

/// Owns at most one [`OscServer`] per UDP port.
#[derive(Default)]
pub struct PortRegistry {
    servers: HashMap<u16, OscServer>,
}

impl PortRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The started server listening on `port`, creating and starting it if
    /// this is the first request.
    pub fn get_or_create(&mut self, port: u16) -> NetworkResult<&mut OscServer> {
        match self.servers.entry(port) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let mut server = OscServer::new(ServerConfig::with_port(port));
                server.start()?;
                Ok(entry.insert(server))
            }
        }
    }

    /// Take ownership of an externally created server. Fails if the port is
    /// already occupied.
    pub fn add(&mut self, server: OscServer) -> NetworkResult<()> {
        let port = server.port();
        if self.servers.contains_key(&port) {
            return Err(NetworkError::PortInUse { port });
        }
        self.servers.insert(port, server);
        Ok(())
    }

    pub fn get_mut(&mut self, port: u16) -> Option<&mut OscServer> {
        self.servers.get_mut(&port)
    }

    pub fn contains(&self, port: u16) -> bool {
        self.servers.contains_key(&port)
    }

    /// Dispose and drop the server on `port`.
    pub fn remove(&mut self, port: u16) -> bool {
        match self.servers.remove(&port) {
            Some(mut server) => {
                server.dispose();
                true
            }
            None => false,
        }
    }

    /// Drain every server's deferred queue. Call once per host tick.
    pub fn update_all(&mut self) {
        for server in self.servers.values_mut() {
            server.update();
        }
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}
