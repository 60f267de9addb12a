//! Track telemetry wire protocol
//!
//! # Datagram layout
//!
//! ```text
//! ┌───────────────┬────────────────────────────────────────────┐
//! │ Header (22 B) │ Payload                                    │
//! │ see header.rs │ 101: one 28-byte record                    │
//! │               │ 104: N × 28-byte records (+ partial tail)  │
//! └───────────────┴────────────────────────────────────────────┘
//! ```
//!
//! There is no single authoritative layout: header start, wide-field byte
//! order and coordinate encoding all vary by deployment. Two decode paths:
//!
//! - [`DecodePath::Resolved`]: score every header hypothesis, then decode the
//!   payload behind the winner (default)
//! - [`DecodePath::FixedOffset`]: legacy layout with the opcode at byte 1

pub mod constants;
pub mod cursor;
pub mod fixed_offset;
pub mod header;
pub mod track101;
pub mod track104;

pub use fixed_offset::decode_fixed_offset;
pub use header::{HeaderCandidate, resolve};
pub use track101::decode101;
pub use track104::decode104;

use crate::types::DecodedMessage;
use constants::{OPCODE_TRACK_LIST, OPCODE_TRACK_STATE};
use serde::{Deserialize, Serialize};

/// Reasons a datagram is dropped
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Fewer bytes than one header
    #[error("datagram too short for header: {len} bytes")]
    HeaderTooShort { len: usize },

    /// No header hypothesis could be built
    #[error("no plausible header")]
    NoPlausibleHeader,

    /// Opcode 101 payload shorter than one record
    #[error("payload too short: need {needed} bytes, have {available}")]
    PayloadTooShort { needed: usize, available: usize },

    /// Opcode other than 101 / 104
    #[error("unsupported opcode {0}")]
    UnsupportedOpcode(u8),
}

/// Which decoder handles inbound datagrams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePath {
    /// Header resolution followed by payload decode
    #[default]
    Resolved,
    /// Legacy fixed-offset layout
    FixedOffset,
}

/// Decode one datagram through the resolved-header path
pub fn decode_datagram(buf: &[u8]) -> Result<DecodedMessage, DecodeError> {
    let best = resolve(buf)?;
    let payload_start = best.payload_start();

    match best.header.op_code {
        OPCODE_TRACK_STATE => Ok(DecodedMessage::Track101(decode101(
            buf,
            &best.header,
            payload_start,
        )?)),
        OPCODE_TRACK_LIST => Ok(DecodedMessage::Track104(decode104(
            buf,
            &best.header,
            payload_start,
        ))),
        other => Err(DecodeError::UnsupportedOpcode(other)),
    }
}

/// Decode one datagram through the configured path
pub fn decode_with(path: DecodePath, buf: &[u8]) -> Result<DecodedMessage, DecodeError> {
    match path {
        DecodePath::Resolved => decode_datagram(buf),
        DecodePath::FixedOffset => decode_fixed_offset(buf),
    }
}
