//! Byte-order aware field readers
//!
//! All readers are bounds-checked and return `None` when the field would run
//! past the end of the buffer, so hypothesis decoders can bail out with `?`.

use serde::Serialize;

/// Byte order of a multi-byte wire field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Probe order used by every hypothesis loop (little-endian preferred)
    pub const PROBE_ORDER: [ByteOrder; 2] = [ByteOrder::Little, ByteOrder::Big];

    #[inline]
    pub fn read_u16(self, buf: &[u8], offset: usize) -> Option<u16> {
        let bytes: [u8; 2] = take(buf, offset)?;
        Some(match self {
            ByteOrder::Little => u16::from_le_bytes(bytes),
            ByteOrder::Big => u16::from_be_bytes(bytes),
        })
    }

    #[inline]
    pub fn read_u32(self, buf: &[u8], offset: usize) -> Option<u32> {
        let bytes: [u8; 4] = take(buf, offset)?;
        Some(match self {
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
        })
    }

    #[inline]
    pub fn read_i32(self, buf: &[u8], offset: usize) -> Option<i32> {
        let bytes: [u8; 4] = take(buf, offset)?;
        Some(match self {
            ByteOrder::Little => i32::from_le_bytes(bytes),
            ByteOrder::Big => i32::from_be_bytes(bytes),
        })
    }

    #[inline]
    pub fn read_u64(self, buf: &[u8], offset: usize) -> Option<u64> {
        let bytes: [u8; 8] = take(buf, offset)?;
        Some(match self {
            ByteOrder::Little => u64::from_le_bytes(bytes),
            ByteOrder::Big => u64::from_be_bytes(bytes),
        })
    }

    /// IEEE-754 single precision
    #[inline]
    pub fn read_f32(self, buf: &[u8], offset: usize) -> Option<f32> {
        self.read_u32(buf, offset).map(f32::from_bits)
    }
}

#[inline]
fn take<const N: usize>(buf: &[u8], offset: usize) -> Option<[u8; N]> {
    let end = offset.checked_add(N)?;
    buf.get(offset..end)?.try_into().ok()
}

/// Read a single byte
#[inline]
pub fn read_u8(buf: &[u8], offset: usize) -> Option<u8> {
    buf.get(offset).copied()
}

/// Round to 2 decimal places, widening to f64 first
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
