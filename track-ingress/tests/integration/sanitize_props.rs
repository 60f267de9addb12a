//! Properties of the best-effort sanitizers over varied inputs

use crate::datagrams::{track_101, track_104};
use flate2::Compression;
use flate2::write::{GzEncoder, ZlibEncoder};
use std::io::Write;
use track_ingress::decode_datagram;
use track_ingress::sanitize::{decode_text_best_effort, decompress_if_compressed};

/// Deterministic byte soup (xorshift) covering every byte value
fn soup(seed: u32, len: usize) -> Vec<u8> {
    let mut x = seed.max(1);
    (0..len)
        .map(|_| {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            x as u8
        })
        .collect()
}

#[test]
fn test_datagrams_pass_through_decompression() {
    for buf in [track_101(1, [1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0]), track_104(4)] {
        assert_eq!(decompress_if_compressed(&buf), buf);
    }
}

#[test]
fn test_compressed_datagram_decodes_after_inflate() {
    let raw = track_104(3);
    let mut gz = GzEncoder::new(Vec::new(), Compression::fast());
    gz.write_all(&raw).unwrap();
    let mut zl = ZlibEncoder::new(Vec::new(), Compression::best());
    zl.write_all(&raw).unwrap();

    for packed in [gz.finish().unwrap(), zl.finish().unwrap()] {
        let inflated = decompress_if_compressed(&packed);
        assert_eq!(inflated, raw);
        assert_eq!(decode_datagram(&inflated).unwrap().members().len(), 3);
    }
}

#[test]
fn test_oversized_output_is_refused() {
    let mut gz = GzEncoder::new(Vec::new(), Compression::default());
    gz.write_all(&vec![0u8; 5 * 1024 * 1024]).unwrap();
    let packed = gz.finish().unwrap();
    assert_eq!(decompress_if_compressed(&packed), packed);
}

#[test]
fn test_text_never_keeps_stray_controls() {
    for seed in 1..200u32 {
        let buf = soup(seed, (seed % 40) as usize);
        let text = decode_text_best_effort(&buf);
        assert!(
            text.chars()
                .all(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r')),
            "seed {} produced {:?}",
            seed,
            text
        );
        assert_eq!(text, text.trim());
        assert_eq!(decode_text_best_effort(&buf), text);
    }
}
