//! Legacy fixed-offset fast path
//!
//! Older deployments were decoded without header resolution: the header is
//! assumed at offset 0 with little-endian wide fields, the opcode is read at
//! byte 1, and the opcode-104 member count is two decimal digit bytes
//! (`buf[16] * 10 + buf[17]`) rather than the single count byte the resolved
//! header carries. Kept for sources that still depend on it; the resolved path
//! in [`super::decode_datagram`] is the default.

use super::DecodeError;
use super::constants::*;
use super::cursor::{ByteOrder, read_u8};
use super::header::decode_header;
use super::track101::decode101;
use super::track104::decode104;
use crate::types::DecodedMessage;

/// Member count as encoded by the legacy layout
pub fn legacy_member_count(buf: &[u8]) -> Option<usize> {
    let tens = read_u8(buf, FIXED_COUNT_TENS_OFFSET)? as usize;
    let units = read_u8(buf, FIXED_COUNT_UNITS_OFFSET)? as usize;
    Some(tens * 10 + units)
}

/// Decode a datagram using the fixed-offset layout
pub fn decode_fixed_offset(buf: &[u8]) -> Result<DecodedMessage, DecodeError> {
    let header = decode_header(buf, 0, ByteOrder::Little, ByteOrder::Little)
        .ok_or(DecodeError::HeaderTooShort { len: buf.len() })?;

    let opcode = read_u8(buf, FIXED_OPCODE_OFFSET).unwrap_or_default();
    match opcode {
        OPCODE_TRACK_STATE => Ok(DecodedMessage::Track101(decode101(
            buf, &header, HEADER_LEN,
        )?)),
        OPCODE_TRACK_LIST => {
            let mut list = decode104(buf, &header, HEADER_LEN);
            let count = legacy_member_count(buf).unwrap_or_default();
            if count > 0 && list.records.len() > count {
                log::debug!(
                    "Legacy 104: member count {} caps {} decoded records",
                    count,
                    list.records.len()
                );
                list.records.truncate(count);
            }
            Ok(DecodedMessage::Track104(list))
        }
        other => Err(DecodeError::UnsupportedOpcode(other)),
    }
}
