//! Shared fixtures for end-to-end tests: a started server on an ephemeral
//! port and a client connected to it over loopback.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Duration;

use anyhow::{Context, Result};

use osc_network::{OscActionPair, OscClient, OscServer, ServerConfig};

/// How long a test waits for a datagram to cross loopback.
pub const RECEIVE_DEADLINE: Duration = Duration::from_secs(2);

/// A started server plus a client aimed at it.
pub struct Loopback {
    pub server: OscServer,
    pub client: OscClient,
}

impl Loopback {
    pub fn new() -> Result<Self> {
        let mut server = OscServer::new(ServerConfig::default());
        server.start().context("starting server")?;
        let port = server.local_port().context("server has no bound port")?;
        let client = OscClient::new("127.0.0.1", port).context("connecting client")?;
        Ok(Self { server, client })
    }

    /// Register a handler that forwards what `read` extracts from each
    /// message into a channel.
    pub fn capture<T, F>(&self, address: &str, read: F) -> Result<Receiver<T>>
    where
        T: Send + 'static,
        F: Fn(&osc_codec::MessageView<'_>) -> T + Send + Sync + 'static,
    {
        let (tx, rx): (Sender<T>, Receiver<T>) = channel();
        self.server
            .register(
                address,
                OscActionPair::new(move |view| {
                    tx.send(read(view)).ok();
                }),
            )
            .with_context(|| format!("registering {address}"))?;
        Ok(rx)
    }
}
