//! Inbound socket ownership and the receive loop
//!
//! # Link states
//!
//! ```text
//!  Disconnected ──connect()──▶ Connecting ──ok──▶ Connected
//!       ▲                          │                  │
//!       └───────── error ──────────┴── socket error ──┘
//! ```
//!
//! A failed connect is returned once to the caller of [`Ingress::connect`];
//! reconnecting is the caller's decision.
//!
//! # Datagram handling
//!
//! Each datagram is processed to completion before the next `recv`:
//!
//! 1. Decode through the configured path
//! 2. On failure, optionally retry after best-effort decompression
//! 3. On success, overwrite the latest snapshot and push the member list
//! 4. On failure, log and drop; the loop keeps running

use super::sink::SinkSet;
use super::snapshot::SnapshotCell;
use crate::config::{DecoderConfig, SourceConfig};
use crate::error::{Error, Result};
use crate::protocol::{DecodeError, decode_with};
use crate::sanitize::{decode_text_best_effort, decompress_if_compressed, hex_ascii_dump};
use crate::types::{DecodedMessage, SnapshotEntry};
use serde::Serialize;
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Maximum UDP datagram size
const MAX_DATAGRAM_SIZE: usize = 65536;

/// Bytes of a dropped datagram included in its debug preview
const PREVIEW_LEN: usize = 64;

/// Connection state of the inbound link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Counters kept by the receive loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IngressStats {
    pub received: u64,
    pub decoded_101: u64,
    pub decoded_104: u64,
    pub dropped: u64,
    /// Datagrams that only decoded after decompression
    pub decompressed: u64,
}

/// Telemetry ingress: owns the socket, decodes, caches, forwards
pub struct Ingress {
    source: SourceConfig,
    decoder: DecoderConfig,
    state: LinkState,
    socket: Option<UdpSocket>,
    snapshot: SnapshotCell,
    sinks: SinkSet,
    stats: IngressStats,
    /// Reusable receive buffer
    buffer: Vec<u8>,
}

impl Ingress {
    pub fn new(source: SourceConfig, decoder: DecoderConfig, sinks: SinkSet) -> Self {
        Self {
            source,
            decoder,
            state: LinkState::Disconnected,
            socket: None,
            snapshot: SnapshotCell::new(),
            sinks,
            stats: IngressStats::default(),
            buffer: vec![0u8; MAX_DATAGRAM_SIZE],
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn stats(&self) -> IngressStats {
        self.stats
    }

    /// Shared handle for late subscribers to pull the latest snapshot
    pub fn snapshot(&self) -> SnapshotCell {
        self.snapshot.clone()
    }

    /// Latest decoded member list
    pub fn latest(&self) -> Arc<[SnapshotEntry]> {
        self.snapshot.latest()
    }

    /// Local address of the inbound socket while connected
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }

    /// Open the socket, connect it to the source and send the greeting
    pub fn connect(&mut self) -> Result<()> {
        self.state = LinkState::Connecting;
        log::info!(
            "Connecting to {}:{} (bind {})",
            self.source.host,
            self.source.port,
            self.source.bind_address
        );

        match self.open_socket() {
            Ok(socket) => {
                log::info!(
                    "Connected to {}:{} from {:?}",
                    self.source.host,
                    self.source.port,
                    socket.local_addr()
                );
                self.socket = Some(socket);
                self.state = LinkState::Connected;
                Ok(())
            }
            Err(e) => {
                log::error!(
                    "Failed to connect to {}:{}: {}",
                    self.source.host,
                    self.source.port,
                    e
                );
                self.state = LinkState::Disconnected;
                Err(e)
            }
        }
    }

    fn open_socket(&self) -> Result<UdpSocket> {
        let socket = UdpSocket::bind(&self.source.bind_address)?;
        socket.connect((self.source.host.as_str(), self.source.port))?;
        socket.set_read_timeout(Some(self.source.read_timeout()))?;
        if !self.source.greeting.is_empty() {
            socket.send(self.source.greeting.as_bytes())?;
            log::debug!("Sent greeting ({} bytes)", self.source.greeting.len());
        }
        Ok(socket)
    }

    /// Release the socket
    pub fn disconnect(&mut self) {
        if self.socket.take().is_some() {
            log::info!("Disconnected from {}:{}", self.source.host, self.source.port);
        }
        self.state = LinkState::Disconnected;
    }

    /// Decode one datagram and deliver the result.
    ///
    /// Errors are logged here; the returned error is informational and the
    /// caller is expected to keep receiving.
    pub fn handle_datagram(&mut self, datagram: &[u8]) -> Result<DecodedMessage> {
        self.stats.received += 1;

        let message = match self.decode(datagram) {
            Ok(message) => message,
            Err(e) => {
                self.stats.dropped += 1;
                log::warn!("Dropping {}-byte datagram: {}", datagram.len(), e);
                let preview = &datagram[..datagram.len().min(PREVIEW_LEN)];
                log::debug!(
                    "Dropped datagram preview: {:?}\n{}",
                    decode_text_best_effort(preview),
                    hex_ascii_dump(preview)
                );
                return Err(Error::Decode(e));
            }
        };

        match &message {
            DecodedMessage::Track101(_) => self.stats.decoded_101 += 1,
            DecodedMessage::Track104(list) => {
                self.stats.decoded_104 += 1;
                if list.records.is_empty() && !list.raw_remainder.is_empty() {
                    log::debug!(
                        "Track 104 without usable records, raw payload:\n{}",
                        hex_ascii_dump(&list.raw_remainder)
                    );
                }
            }
        }

        let members = message.members();
        self.snapshot.store(&members);
        self.sinks.publish(&members);
        log::trace!(
            "Opcode {} from id {}: {} members",
            message.header().op_code,
            message.header().global_id,
            members.len()
        );

        Ok(message)
    }

    fn decode(&mut self, datagram: &[u8]) -> std::result::Result<DecodedMessage, DecodeError> {
        let err = match decode_with(self.decoder.path, datagram) {
            Ok(message) => return Ok(message),
            Err(e) => e,
        };
        if !self.decoder.decompress_fallback {
            return Err(err);
        }

        let inflated = decompress_if_compressed(datagram);
        if inflated == datagram {
            return Err(err);
        }
        let message = decode_with(self.decoder.path, &inflated)?;
        self.stats.decompressed += 1;
        log::debug!(
            "Decoded after decompression ({} -> {} bytes)",
            datagram.len(),
            inflated.len()
        );
        Ok(message)
    }

    /// Receive and handle at most one datagram.
    ///
    /// Returns `Ok(None)` on read timeout or when the datagram was dropped.
    /// A socket error moves the link to `Disconnected` and is returned.
    pub fn poll_once(&mut self) -> Result<Option<DecodedMessage>> {
        let Some(socket) = self.socket.as_ref() else {
            return Err(Error::NotConnected);
        };

        let len = match socket.recv(&mut self.buffer) {
            Ok(len) => len,
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) =>
            {
                return Ok(None);
            }
            Err(e) => {
                log::error!("Socket error: {}", e);
                self.disconnect();
                return Err(Error::Io(e));
            }
        };

        let buffer = std::mem::take(&mut self.buffer);
        let result = self.handle_datagram(&buffer[..len]);
        self.buffer = buffer;

        Ok(result.ok())
    }

    /// Receive until `running` is cleared or the socket fails
    pub fn run(&mut self, running: &AtomicBool) -> Result<()> {
        if self.state != LinkState::Connected {
            return Err(Error::NotConnected);
        }
        log::info!("Ingress started ({:?} decode path)", self.decoder.path);

        let mut result = Ok(());
        while running.load(Ordering::Relaxed) {
            if let Err(e) = self.poll_once() {
                result = Err(e);
                break;
            }
        }

        self.disconnect();
        log::info!(
            "Ingress stopped: received={} decoded_101={} decoded_104={} dropped={} decompressed={}",
            self.stats.received,
            self.stats.decoded_101,
            self.stats.decoded_104,
            self.stats.dropped,
            self.stats.decompressed
        );
        result
    }
}
