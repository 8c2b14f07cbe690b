//! # OSC Client - UDP Sender
//!
//! A thin connected-UDP sender owning a wire-format writer. Each `send_*`
//! method resets the writer, writes the address, the type-tag string and
//! the arguments, and hands the assembled bytes to the socket. The writer's
//! buffer is reused across sends, so a steady-state client does not
//! allocate per message.

use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs, UdpSocket};

use tracing::debug;

use osc_codec::OscWriter;
use osc_types::{Color32, MidiMessage, NtpTimestamp};

use crate::config::ClientConfig;
use crate::error::{NetworkError, NetworkResult};

/// A UDP OSC sender bound to one destination.
#[derive(Debug)]
pub struct OscClient {
    socket: UdpSocket,
    destination: SocketAddr,
    writer: OscWriter,
}

impl OscClient {
    /// Create a client sending to `host:port`. Destination
    /// `255.255.255.255` enables broadcast on the socket.
    pub fn new(host: &str, port: u16) -> NetworkResult<Self> {
        let setup = |source| NetworkError::ClientSetup {
            destination: format!("{host}:{port}"),
            source,
        };

        let destination = (host, port)
            .to_socket_addrs()
            .map_err(setup)?
            .next()
            .ok_or_else(|| {
                setup(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "destination resolved to no addresses",
                ))
            })?;

        let socket = UdpSocket::bind(("0.0.0.0", 0)).map_err(setup)?;
        if destination.ip() == Ipv4Addr::BROADCAST {
            socket.set_broadcast(true).map_err(setup)?;
        }
        socket.connect(destination).map_err(setup)?;

        debug!(%destination, "osc client connected");
        Ok(Self { socket, destination, writer: OscWriter::new() })
    }

    pub fn from_config(config: &ClientConfig) -> NetworkResult<Self> {
        Self::new(&config.host, config.port)
    }

    pub fn destination(&self) -> SocketAddr {
        self.destination
    }

    fn flush(&mut self) -> NetworkResult<()> {
        self.socket.send(self.writer.as_slice()).map_err(|source| NetworkError::Send {
            destination: self.destination.to_string(),
            source,
        })?;
        Ok(())
    }

    /// Send a message with no elements.
    pub fn send_message(&mut self, address: &str) -> NetworkResult<()> {
        self.writer.begin_message(address, ",");
        self.flush()
    }

    /// Send a single 32-bit integer element.
    pub fn send_int32(&mut self, address: &str, value: i32) -> NetworkResult<()> {
        self.writer.begin_message(address, ",i");
        self.writer.write_int32(value);
        self.flush()
    }

    /// Send up to several 32-bit integer elements.
    pub fn send_int32s(&mut self, address: &str, values: &[i32]) -> NetworkResult<()> {
        let mut tags = String::with_capacity(values.len() + 1);
        tags.push(',');
        tags.extend(std::iter::repeat('i').take(values.len()));
        self.writer.begin_message(address, &tags);
        for &value in values {
            self.writer.write_int32(value);
        }
        self.flush()
    }

    /// Send a single 32-bit float element.
    pub fn send_float32(&mut self, address: &str, value: f32) -> NetworkResult<()> {
        self.writer.begin_message(address, ",f");
        self.writer.write_float32(value);
        self.flush()
    }

    /// Send up to several 32-bit float elements (vectors, colors as floats,
    /// and so on).
    pub fn send_float32s(&mut self, address: &str, values: &[f32]) -> NetworkResult<()> {
        let mut tags = String::with_capacity(values.len() + 1);
        tags.push(',');
        tags.extend(std::iter::repeat('f').take(values.len()));
        self.writer.begin_message(address, &tags);
        for &value in values {
            self.writer.write_float32(value);
        }
        self.flush()
    }

    /// Send a single 64-bit integer element.
    pub fn send_int64(&mut self, address: &str, value: i64) -> NetworkResult<()> {
        self.writer.begin_message(address, ",h");
        self.writer.write_int64(value);
        self.flush()
    }

    /// Send a single 64-bit float element.
    pub fn send_float64(&mut self, address: &str, value: f64) -> NetworkResult<()> {
        self.writer.begin_message(address, ",d");
        self.writer.write_float64(value);
        self.flush()
    }

    /// Send a single string element. The string must be ascii.
    pub fn send_string(&mut self, address: &str, value: &str) -> NetworkResult<()> {
        self.writer.begin_message(address, ",s");
        self.writer.write_str(value);
        self.flush()
    }

    /// Send a single blob element.
    pub fn send_blob(&mut self, address: &str, value: &[u8]) -> NetworkResult<()> {
        self.writer.begin_message(address, ",b");
        self.writer.write_blob(value);
        self.flush()
    }

    /// Send a boolean element, carried entirely in the type tag.
    pub fn send_bool(&mut self, address: &str, value: bool) -> NetworkResult<()> {
        self.writer.begin_message(address, if value { ",T" } else { ",F" });
        self.flush()
    }

    /// Send a nil element.
    pub fn send_nil(&mut self, address: &str) -> NetworkResult<()> {
        self.writer.begin_message(address, ",N");
        self.flush()
    }

    /// Send an infinitum element.
    pub fn send_infinitum(&mut self, address: &str) -> NetworkResult<()> {
        self.writer.begin_message(address, ",I");
        self.flush()
    }

    /// Send a single ascii character element.
    pub fn send_char(&mut self, address: &str, value: char) -> NetworkResult<()> {
        self.writer.begin_message(address, ",c");
        self.writer.write_char(value);
        self.flush()
    }

    /// Send a single RGBA color element.
    pub fn send_color(&mut self, address: &str, value: Color32) -> NetworkResult<()> {
        self.writer.begin_message(address, ",r");
        self.writer.write_color(value);
        self.flush()
    }

    /// Send a single MIDI message element.
    pub fn send_midi(&mut self, address: &str, value: MidiMessage) -> NetworkResult<()> {
        self.writer.begin_message(address, ",m");
        self.writer.write_midi(value);
        self.flush()
    }

    /// Send a single NTP timestamp element.
    pub fn send_timestamp(&mut self, address: &str, value: NtpTimestamp) -> NetworkResult<()> {
        self.writer.begin_message(address, ",t");
        self.writer.write_timestamp(value);
        self.flush()
    }

    /// Compose a message by hand against the owned writer, then send it
    /// with [`OscClient::send_written`].
    pub fn writer(&mut self) -> &mut OscWriter {
        &mut self.writer
    }

    /// Send whatever the writer currently holds.
    pub fn send_written(&mut self) -> NetworkResult<()> {
        self.flush()
    }
}
