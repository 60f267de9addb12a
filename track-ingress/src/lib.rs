//! Track Ingress - inbound telemetry decoder for tactical track datagrams
//!
//! Turns raw UDP datagrams from an external tracking/scheduling source into
//! typed track records:
//!
//! - **Opcode 101**: single-node track state
//! - **Opcode 104**: multi-track list
//!
//! The source has no single wire layout, so the decoder tries several
//! interpretations and keeps the most plausible one (see [`protocol`]).
//!
//! ## Layers
//!
//! ```text
//! ingress   socket, receive loop, snapshot cache, delivery
//!    │
//! protocol  header resolution, payload decoders, legacy fast path
//!    │
//! sanitize  best-effort decompression / text decoding
//! ```

pub mod config;
pub mod error;
pub mod ingress;
pub mod protocol;
pub mod sanitize;
pub mod types;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Error, Result};
pub use ingress::{Ingress, SnapshotCell};
pub use protocol::{DecodeError, DecodePath, decode_datagram, decode_with};
pub use types::{DecodedMessage, TrackMember};
