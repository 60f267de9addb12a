//! Wire constants for the track telemetry datagrams

// Header layout (22 bytes, field offsets relative to header start)
pub const HEADER_LEN: usize = 22;
pub const OFF_MESSAGE_COUNTER: usize = 0;
pub const OFF_OPCODE: usize = 1;
pub const OFF_ICD_MAJOR: usize = 2;
pub const OFF_ICD_MINOR: usize = 3;
pub const OFF_PAYLOAD_SIZE: usize = 4; // u32, byte order unknown
pub const OFF_TIMESTAMP: usize = 8; // u64 ms since epoch, byte order unknown
pub const OFF_NUM_MEMBERS: usize = 16;
pub const OFF_RESERVED: usize = 17; // 3 bytes
pub const OFF_GLOBAL_ID: usize = 20; // u16, always little-endian

// Opcodes
pub const OPCODE_TRACK_STATE: u8 = 101; // Single-node state
pub const OPCODE_TRACK_LIST: u8 = 104; // Multi-track list

/// Seven 4-byte fields: lat, lon, alt, veNorth, veEast, veUp, trueHeading
pub const TRACK_RECORD_LEN: usize = 28;

/// Header start offsets probed by the resolver are `0..MAX_START_OFFSETS`
pub const MAX_START_OFFSETS: usize = 8;

/// ICD version bytes above this are treated as implausible
pub const MAX_ICD_VERSION: u8 = 32;

// Plausible timestamp window: [2000-01-01, 2100-01-01) in ms since epoch
pub const TIMESTAMP_MIN_MS: u64 = 946_684_800_000;
pub const TIMESTAMP_MAX_MS: u64 = 4_102_444_800_000;

/// Latitude/longitude scale for the integer coordinate encoding
pub const COORD_INT_SCALE: f64 = 1e-7;

// Legacy fixed-offset fast path
pub const FIXED_OPCODE_OFFSET: usize = 1;
pub const FIXED_COUNT_TENS_OFFSET: usize = 16;
pub const FIXED_COUNT_UNITS_OFFSET: usize = 17;

// Compression magic
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];
pub const ZLIB_LEADING_BYTE: u8 = 0x78;

/// Upper bound on decompressed output (4 MiB)
pub const MAX_DECOMPRESSED_SIZE: usize = 4 * 1024 * 1024;
