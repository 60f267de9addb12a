//! End-to-end datagram decoding through the public API

use crate::datagrams::{Order, TIMESTAMP_MS, header, record, track_101, track_104};
use approx::assert_relative_eq;
use track_ingress::protocol::header::candidates;
use track_ingress::types::CoordinateEncoding;
use track_ingress::{DecodeError, DecodePath, DecodedMessage, decode_datagram, decode_with};

fn expect_101(message: DecodedMessage) -> track_ingress::types::TrackState101 {
    match message {
        DecodedMessage::Track101(state) => state,
        other => panic!("expected opcode 101, got {:?}", other),
    }
}

fn expect_104(message: DecodedMessage) -> track_ingress::types::TrackList104 {
    match message {
        DecodedMessage::Track104(list) => list,
        other => panic!("expected opcode 104, got {:?}", other),
    }
}

#[test]
fn test_single_track_little_endian() {
    let buf = track_101(7, [37.5, -122.3, 1000.0, 10.0, 5.0, 0.0, 90.0]);
    assert_eq!(buf.len(), 50);

    let state = expect_101(decode_datagram(&buf).unwrap());
    assert_eq!(state.header.op_code, 101);
    assert_eq!(state.header.global_id, 7);
    assert_eq!(state.header.payload_size, 28);
    assert_eq!(state.header.timestamp_ms, TIMESTAMP_MS);
    assert_eq!(state.encoding, CoordinateEncoding::LittleEndianFloat);
    assert!(state.geodetic_ok);

    let k = state.kinematics;
    assert_eq!(k.latitude, 37.5);
    assert_eq!(k.longitude, -122.3);
    assert_eq!(k.altitude, 1000.0);
    assert_eq!(k.ve_north, 10.0);
    assert_eq!(k.ve_east, 5.0);
    assert_eq!(k.ve_up, 0.0);
    assert_eq!(k.true_heading, 90.0);
}

#[test]
fn test_single_track_members() {
    let buf = track_101(7, [37.5, -122.3, 1000.0, 10.0, 5.0, 0.0, 90.0]);
    let members = decode_datagram(&buf).unwrap().members();
    assert_eq!(members.len(), 1);

    let m = &members[0];
    assert_eq!(m.global_id, 7);
    assert_eq!(m.true_heading, Some(90.0));
    assert_relative_eq!(m.ground_speed.unwrap(), 11.18, epsilon = 1e-9);
    assert_relative_eq!(m.heading.unwrap(), 26.57, epsilon = 1e-9);
}

#[test]
fn test_single_track_big_endian() {
    // Trailing 0xFF makes the little-endian reading of this latitude huge
    let lat = f32::from_bits(0x4216_00FF);
    let mut buf = header(101, 28, 1, 9, Order::Big);
    buf.extend(record([lat, -122.3, 250.0, 1.0, 1.0, 0.0, 45.0], Order::Big));

    let state = expect_101(decode_datagram(&buf).unwrap());
    assert_eq!(state.header.payload_size, 28);
    assert_eq!(state.header.timestamp_ms, TIMESTAMP_MS);
    assert_eq!(state.encoding, CoordinateEncoding::BigEndianFloat);
    assert_eq!(state.kinematics.latitude, 37.5);
    assert_eq!(state.kinematics.longitude, -122.3);
    assert_eq!(state.kinematics.altitude, 250.0);
}

#[test]
fn test_header_behind_leading_junk() {
    let mut buf = vec![0xAA, 0xBB, 0xCC];
    buf.extend(track_101(21, [51.5, -0.12, 30.0, 0.0, 0.0, 0.0, 180.0]));

    let state = expect_101(decode_datagram(&buf).unwrap());
    assert_eq!(state.header.global_id, 21);
    assert_eq!(state.kinematics.latitude, 51.5);
    assert_eq!(state.kinematics.longitude, -0.12);
}

#[test]
fn test_track_list_record_counts() {
    for n in 0..=5usize {
        let list = expect_104(decode_datagram(&track_104(n)).unwrap());
        assert_eq!(list.records.len(), n, "n = {}", n);
        assert_eq!(list.raw_remainder.len(), 28 * n);

        let members = DecodedMessage::Track104(list).members();
        for (i, m) in members.iter().enumerate() {
            assert_eq!(m.global_id as usize, i);
            assert_eq!(m.latitude, 10.0 + i as f64);
            assert_eq!(m.ground_speed, Some(5.0));
        }
    }
}

#[test]
fn test_track_list_truncated_record() {
    let mut buf = header(104, 28 * 2 + 13, 3, 3, Order::Little);
    for i in 0..3 {
        buf.extend(record(
            [1.0 + i as f32, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0],
            Order::Little,
        ));
    }
    buf.truncate(22 + 28 * 2 + 13);

    let list = expect_104(decode_datagram(&buf).unwrap());
    assert_eq!(list.records.len(), 2);
    assert_eq!(list.records[1].kinematics.latitude, 2.0);
    assert_eq!(list.raw_remainder, buf[22..].to_vec());
}

#[test]
fn test_rejections() {
    assert_eq!(
        decode_datagram(&[0u8; 21]),
        Err(DecodeError::HeaderTooShort { len: 21 })
    );

    let mut short = header(101, 28, 1, 1, Order::Little);
    short.extend_from_slice(&[0u8; 10]);
    assert_eq!(
        decode_datagram(&short),
        Err(DecodeError::PayloadTooShort {
            needed: 28,
            available: 10
        })
    );

    let other = header(55, 0, 0, 1, Order::Little);
    assert_eq!(
        decode_datagram(&other),
        Err(DecodeError::UnsupportedOpcode(55))
    );
}

#[test]
fn test_decoding_is_deterministic() {
    let buf = track_104(4);
    let first = decode_datagram(&buf).unwrap();
    for _ in 0..10 {
        assert_eq!(decode_datagram(&buf).unwrap(), first);
    }
    assert_eq!(candidates(&buf), candidates(&buf));
}

#[test]
fn test_candidate_budget() {
    assert!(candidates(&[0u8; 21]).is_empty());
    assert_eq!(candidates(&[0u8; 22]).len(), 4);
    assert_eq!(candidates(&track_104(5)).len(), 32);
}

#[test]
fn test_fixed_offset_path() {
    let buf = track_101(5, [10.0, 20.0, 30.0, 0.0, 0.0, 0.0, 0.0]);
    let state = expect_101(decode_with(DecodePath::FixedOffset, &buf).unwrap());
    assert_eq!(state.header.global_id, 5);
    assert_eq!(state.kinematics.latitude, 10.0);

    // Legacy count digits at bytes 16/17 cap the records
    let mut list_buf = track_104(3);
    list_buf[16] = 0;
    list_buf[17] = 2;
    let list = expect_104(decode_with(DecodePath::FixedOffset, &list_buf).unwrap());
    assert_eq!(list.records.len(), 2);

    // No header search: shifted datagrams are not recognized
    let mut shifted = vec![0xAA, 0xBB, 0xCC];
    shifted.extend(track_101(5, [10.0, 20.0, 30.0, 0.0, 0.0, 0.0, 0.0]));
    assert_eq!(
        decode_with(DecodePath::FixedOffset, &shifted),
        Err(DecodeError::UnsupportedOpcode(0xBB))
    );
}

#[test]
fn test_json_shape() {
    let buf = track_101(7, [37.5, -122.3, 1000.0, 10.0, 5.0, 0.0, 90.0]);
    let json = serde_json::to_value(decode_datagram(&buf).unwrap()).unwrap();
    assert_eq!(json["opcode"], "101");
    assert_eq!(json["latitude"], 37.5);
    assert_eq!(json["header"]["global_id"], 7);
    assert_eq!(json["encoding"], "LittleEndianFloat");
}
