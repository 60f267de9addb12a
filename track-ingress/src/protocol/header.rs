//! Header resolution by multi-hypothesis scoring.
//!
//! The 22-byte header carries no sync marker and deployments disagree on where
//! it starts and on the byte order of its two wide fields. The resolver
//! therefore decodes the header under every combination of
//!
//! ```text
//! start offset        0 ..= min(7, len - 22)
//! payload-size order  little | big
//! timestamp order     little | big
//! ```
//!
//! and keeps the most plausible reading.
//!
//! # Scoring
//!
//! | Signal | Points |
//! |--------|--------|
//! | opcode is 101 or 104 | +2 |
//! | both ICD version bytes < 32 | +1 |
//! | payload size == bytes after header | +3 |
//! | payload size == whole buffer length | +1 |
//! | payload size in (0, remaining + 22] | +1 |
//! | global id fits u16 | +1 |
//! | timestamp in [2000-01-01, 2100-01-01) | +1 |
//!
//! Ties go to the lowest start offset, then to little-endian (size field
//! first, timestamp second). The candidate order is fixed, so resolution is
//! deterministic for a given buffer.

use super::DecodeError;
use super::constants::*;
use super::cursor::{ByteOrder, read_u8};
use crate::types::MessageHeader;
use serde::Serialize;

/// One header interpretation with its plausibility score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderCandidate {
    pub start_offset: usize,
    pub size_order: ByteOrder,
    pub timestamp_order: ByteOrder,
    pub header: MessageHeader,
    pub score: u32,
}

impl HeaderCandidate {
    /// Offset of the first payload byte in the original buffer
    #[inline]
    pub fn payload_start(&self) -> usize {
        self.start_offset + HEADER_LEN
    }
}

/// Decode the header at `start` under the given field byte orders.
///
/// Returns `None` if the header would run past the buffer.
pub fn decode_header(
    buf: &[u8],
    start: usize,
    size_order: ByteOrder,
    timestamp_order: ByteOrder,
) -> Option<MessageHeader> {
    let h = buf.get(start..start.checked_add(HEADER_LEN)?)?;
    Some(MessageHeader {
        message_counter: read_u8(h, OFF_MESSAGE_COUNTER)?,
        op_code: read_u8(h, OFF_OPCODE)?,
        icd_version_major: read_u8(h, OFF_ICD_MAJOR)?,
        icd_version_minor: read_u8(h, OFF_ICD_MINOR)?,
        payload_size: size_order.read_u32(h, OFF_PAYLOAD_SIZE)?,
        timestamp_ms: timestamp_order.read_u64(h, OFF_TIMESTAMP)?,
        num_members: read_u8(h, OFF_NUM_MEMBERS)?,
        reserved: [
            read_u8(h, OFF_RESERVED)?,
            read_u8(h, OFF_RESERVED + 1)?,
            read_u8(h, OFF_RESERVED + 2)?,
        ],
        global_id: ByteOrder::Little.read_u16(h, OFF_GLOBAL_ID)?,
    })
}

/// Plausibility score of a decoded header within a buffer of `buf_len` bytes
pub fn score_header(header: &MessageHeader, start: usize, buf_len: usize) -> u32 {
    let remaining = buf_len.saturating_sub(start + HEADER_LEN) as u64;
    let payload_size = header.payload_size as u64;
    let mut score = 0;

    if matches!(header.op_code, OPCODE_TRACK_STATE | OPCODE_TRACK_LIST) {
        score += 2;
    }
    if header.icd_version_major < MAX_ICD_VERSION && header.icd_version_minor < MAX_ICD_VERSION {
        score += 1;
    }
    if payload_size == remaining {
        score += 3;
    }
    if payload_size == buf_len as u64 {
        score += 1;
    }
    if payload_size > 0 && payload_size <= remaining + HEADER_LEN as u64 {
        score += 1;
    }
    // Constant point: the id is read as u16
    if u16::try_from(header.global_id as u32).is_ok() {
        score += 1;
    }
    if (TIMESTAMP_MIN_MS..TIMESTAMP_MAX_MS).contains(&header.timestamp_ms) {
        score += 1;
    }

    score
}

/// Enumerate every header hypothesis for `buf`, in tie-break order
pub fn candidates(buf: &[u8]) -> Vec<HeaderCandidate> {
    if buf.len() < HEADER_LEN {
        return Vec::new();
    }
    let max_start = (buf.len() - HEADER_LEN).min(MAX_START_OFFSETS - 1);

    let mut out = Vec::with_capacity((max_start + 1) * 4);
    for start in 0..=max_start {
        for size_order in ByteOrder::PROBE_ORDER {
            for timestamp_order in ByteOrder::PROBE_ORDER {
                let Some(header) = decode_header(buf, start, size_order, timestamp_order) else {
                    continue;
                };
                out.push(HeaderCandidate {
                    start_offset: start,
                    size_order,
                    timestamp_order,
                    header,
                    score: score_header(&header, start, buf.len()),
                });
            }
        }
    }
    out
}

/// Resolve the most plausible header of a datagram
pub fn resolve(buf: &[u8]) -> Result<HeaderCandidate, DecodeError> {
    if buf.len() < HEADER_LEN {
        return Err(DecodeError::HeaderTooShort { len: buf.len() });
    }

    // Strictly-greater keeps the earliest candidate on ties
    let mut best: Option<HeaderCandidate> = None;
    for candidate in candidates(buf) {
        match best {
            Some(ref b) if candidate.score <= b.score => {}
            _ => best = Some(candidate),
        }
    }

    let best = best.ok_or(DecodeError::NoPlausibleHeader)?;
    log::trace!(
        "Resolved header: offset={} size={:?} ts={:?} opcode={} score={}",
        best.start_offset,
        best.size_order,
        best.timestamp_order,
        best.header.op_code,
        best.score
    );
    Ok(best)
}
