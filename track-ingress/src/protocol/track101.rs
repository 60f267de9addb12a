//! Opcode 101 payload decoder (single-track state)
//!
//! Payload: seven 4-byte fields, 28 bytes total.
//!
//! ```text
//! ┌─────┬─────┬─────┬─────────┬────────┬──────┬─────────────┐
//! │ lat │ lon │ alt │ veNorth │ veEast │ veUp │ trueHeading │
//! └─────┴─────┴─────┴─────────┴────────┴──────┴─────────────┘
//! ```
//!
//! Encoding hypotheses are tried in order; the first whose lat/lon pass the
//! geodetic check wins:
//!
//! 1. little-endian floats
//! 2. big-endian floats
//! 3. lat/lon little-endian i32 * 1e-7, rest little-endian floats
//! 4. lat/lon big-endian i32 * 1e-7, rest big-endian floats
//!
//! If none passes, hypothesis 1 is returned with `geodetic_ok = false`.

use super::DecodeError;
use super::constants::{COORD_INT_SCALE, TRACK_RECORD_LEN};
use super::cursor::ByteOrder;
use crate::types::{CoordinateEncoding, Kinematics, MessageHeader, TrackState101};

/// Hypothesis order for single-track payloads
pub const HYPOTHESES: [CoordinateEncoding; 4] = [
    CoordinateEncoding::LittleEndianFloat,
    CoordinateEncoding::BigEndianFloat,
    CoordinateEncoding::LittleEndianScaled,
    CoordinateEncoding::BigEndianScaled,
];

/// Decode one 28-byte kinematic block at `offset` under `encoding`.
///
/// Pure function of the bytes. The result is unrounded so the geodetic check
/// sees the wire values; callers round the accepted reading.
pub fn decode_kinematics(
    buf: &[u8],
    offset: usize,
    encoding: CoordinateEncoding,
) -> Option<Kinematics> {
    let (order, scaled) = match encoding {
        CoordinateEncoding::LittleEndianFloat => (ByteOrder::Little, false),
        CoordinateEncoding::BigEndianFloat => (ByteOrder::Big, false),
        CoordinateEncoding::LittleEndianScaled => (ByteOrder::Little, true),
        CoordinateEncoding::BigEndianScaled => (ByteOrder::Big, true),
    };

    let (latitude, longitude) = if scaled {
        (
            order.read_i32(buf, offset)? as f64 * COORD_INT_SCALE,
            order.read_i32(buf, offset + 4)? as f64 * COORD_INT_SCALE,
        )
    } else {
        (
            order.read_f32(buf, offset)? as f64,
            order.read_f32(buf, offset + 4)? as f64,
        )
    };

    Some(Kinematics::from_raw(
        latitude,
        longitude,
        order.read_f32(buf, offset + 8)?,
        order.read_f32(buf, offset + 12)?,
        order.read_f32(buf, offset + 16)?,
        order.read_f32(buf, offset + 20)?,
        order.read_f32(buf, offset + 24)?,
    ))
}

/// Decode an opcode-101 payload starting at `payload_start`
pub fn decode101(
    buf: &[u8],
    header: &MessageHeader,
    payload_start: usize,
) -> Result<TrackState101, DecodeError> {
    let available = buf.len().saturating_sub(payload_start);
    if available < TRACK_RECORD_LEN {
        return Err(DecodeError::PayloadTooShort {
            needed: TRACK_RECORD_LEN,
            available,
        });
    }

    let accepted = HYPOTHESES.iter().find_map(|&encoding| {
        decode_kinematics(buf, payload_start, encoding)
            .filter(Kinematics::is_geodetic)
            .map(|k| (k.rounded(), encoding))
    });

    if let Some((kinematics, encoding)) = accepted {
        return Ok(TrackState101 {
            header: *header,
            kinematics,
            encoding,
            geodetic_ok: true,
        });
    }

    // Length was checked above, so the little-endian reading always exists
    let kinematics = decode_kinematics(buf, payload_start, CoordinateEncoding::LittleEndianFloat)
        .ok_or(DecodeError::PayloadTooShort {
            needed: TRACK_RECORD_LEN,
            available,
        })?
        .rounded();
    log::warn!(
        "Track 101 (id {}): no coordinate hypothesis passed the geodetic check, \
         keeping little-endian reading lat={} lon={}",
        header.global_id,
        kinematics.latitude,
        kinematics.longitude
    );
    Ok(TrackState101 {
        header: *header,
        kinematics,
        encoding: CoordinateEncoding::LittleEndianFloat,
        geodetic_ok: false,
    })
}
