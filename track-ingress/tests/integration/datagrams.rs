//! Datagram builders shared by the scenarios

/// Timestamp used by every built header (2023-11-14)
pub const TIMESTAMP_MS: u64 = 1_700_000_000_000;

/// Header field byte orders
#[derive(Clone, Copy)]
pub enum Order {
    Little,
    Big,
}

/// 22-byte header with the given opcode, payload size and id
pub fn header(
    opcode: u8,
    payload_size: u32,
    num_members: u8,
    global_id: u16,
    order: Order,
) -> Vec<u8> {
    let mut buf = vec![1, opcode, 1, 0];
    match order {
        Order::Little => {
            buf.extend_from_slice(&payload_size.to_le_bytes());
            buf.extend_from_slice(&TIMESTAMP_MS.to_le_bytes());
        }
        Order::Big => {
            buf.extend_from_slice(&payload_size.to_be_bytes());
            buf.extend_from_slice(&TIMESTAMP_MS.to_be_bytes());
        }
    }
    buf.extend_from_slice(&[num_members, 0, 0, 0]);
    buf.extend_from_slice(&global_id.to_le_bytes());
    buf
}

/// Seven-float kinematic record
pub fn record(values: [f32; 7], order: Order) -> Vec<u8> {
    values
        .iter()
        .flat_map(|v| match order {
            Order::Little => v.to_le_bytes(),
            Order::Big => v.to_be_bytes(),
        })
        .collect()
}

/// Opcode-101 datagram, little-endian throughout
pub fn track_101(global_id: u16, values: [f32; 7]) -> Vec<u8> {
    let mut buf = header(101, 28, 1, global_id, Order::Little);
    buf.extend(record(values, Order::Little));
    buf
}

/// Opcode-104 datagram with `n` little-endian records at latitude 10 + slot
pub fn track_104(n: usize) -> Vec<u8> {
    let mut buf = header(104, (28 * n) as u32, n as u8, 3, Order::Little);
    for i in 0..n {
        buf.extend(record(
            [10.0 + i as f32, 20.0, 100.0, 3.0, 4.0, 0.0, 90.0],
            Order::Little,
        ));
    }
    buf
}
