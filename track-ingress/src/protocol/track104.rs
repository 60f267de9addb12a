//! Opcode 104 payload decoder (multi-track list)
//!
//! The payload is a run of fixed 28-byte records with the same layout as the
//! opcode-101 payload. Each record is decoded on its own: little-endian floats
//! first, big-endian floats if the little-endian lat/lon fail the geodetic
//! check. Records are not required to agree with each other, so a mixed or
//! partly corrupted list still yields every usable record.
//!
//! A partial record at the end is ignored. The verbatim bytes after the header
//! are always kept for diagnostic dumps.

use super::constants::TRACK_RECORD_LEN;
use super::track101::decode_kinematics;
use crate::types::{CoordinateEncoding, MessageHeader, TrackList104, TrackRecord104};

/// Slots double as member ids, so a list holds at most one record per u16
const MAX_RECORDS: usize = u16::MAX as usize + 1;

/// Decode one record slice, falling back to big-endian when needed
fn decode_record(chunk: &[u8], slot: u16) -> Option<TrackRecord104> {
    let little = decode_kinematics(chunk, 0, CoordinateEncoding::LittleEndianFloat)?;
    if little.is_geodetic() {
        return Some(TrackRecord104 {
            slot,
            kinematics: little.rounded(),
            encoding: CoordinateEncoding::LittleEndianFloat,
        });
    }

    let big = decode_kinematics(chunk, 0, CoordinateEncoding::BigEndianFloat)?;
    if !big.is_geodetic() {
        log::debug!("Track 104 record {}: neither byte order is geodetic", slot);
    }
    Some(TrackRecord104 {
        slot,
        kinematics: big.rounded(),
        encoding: CoordinateEncoding::BigEndianFloat,
    })
}

/// Decode an opcode-104 payload starting at `payload_start`.
///
/// Never fails: garbage degrades to fewer (or zero) records.
pub fn decode104(buf: &[u8], header: &MessageHeader, payload_start: usize) -> TrackList104 {
    let raw_remainder = buf.get(payload_start..).unwrap_or_default().to_vec();

    let records = if header.payload_size as usize >= TRACK_RECORD_LEN
        && raw_remainder.len() >= TRACK_RECORD_LEN
    {
        let available = raw_remainder.len() / TRACK_RECORD_LEN;
        if available > MAX_RECORDS {
            log::warn!(
                "Track 104: {} records exceed the slot id range, keeping the first {}",
                available,
                MAX_RECORDS
            );
        }
        raw_remainder
            .chunks_exact(TRACK_RECORD_LEN)
            .zip(0..=u16::MAX)
            .filter_map(|(chunk, slot)| decode_record(chunk, slot))
            .collect()
    } else {
        Vec::new()
    };

    let trailing = raw_remainder.len() % TRACK_RECORD_LEN;
    if trailing != 0 && !records.is_empty() {
        log::trace!("Track 104: ignoring {} trailing bytes", trailing);
    }

    TrackList104 {
        header: *header,
        records,
        raw_remainder,
    }
}
