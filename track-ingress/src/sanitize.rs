//! Best-effort buffer sanitizing
//!
//! Fallback helpers for datagrams the decoders cannot use as-is. Nothing in
//! here returns an error: every function degrades to the input (decompression)
//! or to a hex rendering (text).

use crate::protocol::constants::{GZIP_MAGIC, MAX_DECOMPRESSED_SIZE, ZLIB_LEADING_BYTE};
use flate2::read::{DeflateDecoder, MultiGzDecoder, ZlibDecoder};
use std::fmt::Write as _;
use std::io::Read;

/// Bytes shown per line by [`hex_ascii_dump`]
const DUMP_WIDTH: usize = 16;

// ============================================================================
// Decompression
// ============================================================================

/// Read a decoder to the end, rejecting empty or oversized output
fn inflate<R: Read>(reader: R) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    reader
        .take(MAX_DECOMPRESSED_SIZE as u64 + 1)
        .read_to_end(&mut out)
        .ok()?;
    if out.is_empty() || out.len() > MAX_DECOMPRESSED_SIZE {
        return None;
    }
    Some(out)
}

fn gunzip(buf: &[u8]) -> Option<Vec<u8>> {
    inflate(MultiGzDecoder::new(buf))
}

fn zlib_inflate(buf: &[u8]) -> Option<Vec<u8>> {
    inflate(ZlibDecoder::new(buf))
}

fn raw_inflate(buf: &[u8]) -> Option<Vec<u8>> {
    inflate(DeflateDecoder::new(buf))
}

/// Decompress `buf` if it looks compressed, otherwise return it unchanged.
///
/// Order: gzip magic, zlib leading byte, then a last attempt that accepts a
/// zlib stream with another header byte or a headerless deflate stream. Any
/// failure returns the original bytes.
pub fn decompress_if_compressed(buf: &[u8]) -> Vec<u8> {
    let result = if buf.starts_with(&GZIP_MAGIC) {
        gunzip(buf)
    } else if buf.first() == Some(&ZLIB_LEADING_BYTE) {
        zlib_inflate(buf)
    } else {
        zlib_inflate(buf).or_else(|| raw_inflate(buf))
    };

    match result {
        Some(out) => {
            log::trace!("Decompressed {} -> {} bytes", buf.len(), out.len());
            out
        }
        None => buf.to_vec(),
    }
}

// ============================================================================
// Text decoding
// ============================================================================

#[inline]
fn is_stripped_control(c: char) -> bool {
    c.is_control() && !matches!(c, '\t' | '\n' | '\r')
}

/// UTF-16 with a byte-order mark.
///
/// The mark picks the default order; the opposite order wins only if it
/// yields strictly more ASCII code units, since some sources emit `FE FF`
/// ahead of little-endian text.
fn decode_utf16_bom(buf: &[u8]) -> Option<String> {
    let big_endian_mark = match buf {
        [0xFE, 0xFF, ..] => true,
        [0xFF, 0xFE, ..] => false,
        _ => return None,
    };
    let body = &buf[2..];

    let units = |big: bool| -> Vec<u16> {
        body.chunks_exact(2)
            .map(|p| {
                if big {
                    u16::from_be_bytes([p[0], p[1]])
                } else {
                    u16::from_le_bytes([p[0], p[1]])
                }
            })
            .collect()
    };
    fn ascii(units: &[u16]) -> usize {
        units.iter().filter(|&&c| c < 0x80).count()
    }

    let marked = units(big_endian_mark);
    let swapped = units(!big_endian_mark);
    let chosen = if ascii(&swapped) > ascii(&marked) {
        swapped
    } else {
        marked
    };
    String::from_utf16(&chosen).ok()
}

/// Latin-1, refused when the bytes look binary
fn decode_latin1(buf: &[u8]) -> Option<String> {
    let text: String = buf.iter().map(|&b| b as char).collect();
    let controls = text.chars().filter(|&c| is_stripped_control(c)).count();
    if controls * 2 > buf.len() {
        return None;
    }
    Some(text)
}

/// Strip NUL and non-whitespace control characters, then trim
fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|&c| !is_stripped_control(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Decode bytes as text: UTF-16 (with mark), UTF-8, Latin-1, then hex
pub fn decode_text_best_effort(buf: &[u8]) -> String {
    let text = decode_utf16_bom(buf)
        .or_else(|| std::str::from_utf8(buf).ok().map(str::to_owned))
        .or_else(|| decode_latin1(buf))
        .unwrap_or_else(|| hex_string(buf));
    clean_text(&text)
}

fn hex_string(buf: &[u8]) -> String {
    let mut out = String::with_capacity(buf.len() * 2);
    for b in buf {
        let _ = write!(out, "{:02x}", b);
    }
    out
}

// ============================================================================
// Diagnostic dump
// ============================================================================

/// Classic `offset: hex |ascii|` dump, 16 bytes per line
pub fn hex_ascii_dump(buf: &[u8]) -> String {
    let mut out = String::with_capacity(buf.len() * 4 + 16);
    for (line, chunk) in buf.chunks(DUMP_WIDTH).enumerate() {
        let _ = write!(out, "{:04X}: ", line * DUMP_WIDTH);
        for i in 0..DUMP_WIDTH {
            match chunk.get(i) {
                Some(b) => {
                    let _ = write!(out, "{:02X} ", b);
                }
                None => out.push_str("   "),
            }
        }
        out.push('|');
        out.extend(chunk.iter().map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            }
        }));
        out.push_str("|\n");
    }
    out
}
