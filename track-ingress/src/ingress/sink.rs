//! Push delivery of decoded member lists to the presentation layer
//!
//! The presentation layer is an external collaborator; its only contract with
//! the ingress is the member list pushed after every successful decode.
//!
//! # Forwarding wire format
//!
//! [`UdpForwarder`] sends one datagram per list:
//!
//! ```text
//! ┌──────────────────┬──────────────────────────┐
//! │ Length (4 bytes) │ JSON array of members    │
//! │ Big-endian u32   │                          │
//! └──────────────────┴──────────────────────────┘
//! ```

use crate::error::Result;
use crate::types::TrackMember;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;

/// Receiver of decoded member lists
pub trait TrackSink: Send {
    /// Deliver one member list; must not block the receive loop
    fn publish(&self, members: &[TrackMember]) -> Result<()>;
}

/// In-process subscriber channel.
///
/// Bounded and non-blocking: when the subscriber falls behind, the newest
/// list is dropped rather than stalling ingress.
pub struct ChannelSink {
    tx: Sender<Arc<[TrackMember]>>,
}

impl ChannelSink {
    /// Create a sink and the subscriber end of its channel
    pub fn new(capacity: usize) -> (Self, Receiver<Arc<[TrackMember]>>) {
        let (tx, rx) = bounded(capacity);
        (Self { tx }, rx)
    }
}

impl TrackSink for ChannelSink {
    fn publish(&self, members: &[TrackMember]) -> Result<()> {
        match self.tx.try_send(Arc::from(members)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                log::trace!("Subscriber channel full, dropping member list");
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => {
                log::trace!("Subscriber channel closed");
                Ok(())
            }
        }
    }
}

/// Maximum forwarded datagram (length prefix + JSON)
const MAX_FORWARD_SIZE: usize = 65_507;

/// Forwards member lists as length-prefixed JSON over UDP
pub struct UdpForwarder {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpForwarder {
    /// Bind an ephemeral local socket for forwarding to `target`
    pub fn new(target: SocketAddr) -> Result<Self> {
        let bind = if target.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(bind)?;
        log::info!("Forwarding member lists to {}", target);
        Ok(Self { socket, target })
    }

    /// Serialize one member list into a framed datagram
    pub fn frame(members: &[TrackMember]) -> Result<Vec<u8>> {
        let payload = serde_json::to_vec(members)?;
        let mut buffer = Vec::with_capacity(4 + payload.len());
        buffer.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        buffer.extend_from_slice(&payload);
        Ok(buffer)
    }
}

impl TrackSink for UdpForwarder {
    fn publish(&self, members: &[TrackMember]) -> Result<()> {
        let buffer = Self::frame(members)?;
        if buffer.len() > MAX_FORWARD_SIZE {
            log::warn!(
                "Member list of {} tracks too large to forward ({} bytes)",
                members.len(),
                buffer.len()
            );
            return Ok(());
        }
        self.socket.send_to(&buffer, self.target)?;
        Ok(())
    }
}

/// Fan-out to several sinks; a failing sink does not stop the others
#[derive(Default)]
pub struct SinkSet {
    sinks: Vec<Box<dyn TrackSink>>,
}

impl SinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sink: Box<dyn TrackSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn publish(&self, members: &[TrackMember]) {
        for sink in &self.sinks {
            if let Err(e) = sink.publish(members) {
                log::warn!("Failed to publish member list: {}", e);
            }
        }
    }
}
