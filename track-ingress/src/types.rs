//! Decoded telemetry data model.
//!
//! Key types:
//! - [`MessageHeader`]: the 22-byte header shared by every datagram
//! - [`TrackState101`] / [`TrackList104`]: opcode-specific decode results
//! - [`DecodedMessage`]: tagged union handed to the ingress loop
//! - [`TrackMember`]: flattened per-track view pushed to the presentation layer

use crate::protocol::cursor::round2;
use serde::Serialize;

/// Fixed 22-byte datagram header.
///
/// `op_code` is only meaningful for 101 and 104; `payload_size` is advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MessageHeader {
    pub message_counter: u8,
    pub op_code: u8,
    pub icd_version_major: u8,
    pub icd_version_minor: u8,
    pub payload_size: u32,
    pub timestamp_ms: u64,
    pub num_members: u8,
    pub reserved: [u8; 3],
    pub global_id: u16,
}

/// Which coordinate hypothesis produced a kinematic block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CoordinateEncoding {
    /// Seven little-endian IEEE-754 floats
    LittleEndianFloat,
    /// Seven big-endian IEEE-754 floats
    BigEndianFloat,
    /// lat/lon as little-endian i32 * 1e-7, remaining fields little-endian floats
    LittleEndianScaled,
    /// lat/lon as big-endian i32 * 1e-7, remaining fields big-endian floats
    BigEndianScaled,
}

/// Position, velocity and heading of one track.
///
/// Decoders check the raw reading and hand out [`Kinematics::rounded`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Kinematics {
    /// Degrees, [-90, 90] when sane
    pub latitude: f64,
    /// Degrees, [-180, 180] when sane
    pub longitude: f64,
    pub altitude: f64,
    pub ve_north: f64,
    pub ve_east: f64,
    pub ve_up: f64,
    /// Degrees
    pub true_heading: f64,
}

impl Kinematics {
    /// Build from raw wire values, widened to f64 and not yet rounded
    pub fn from_raw(
        latitude: f64,
        longitude: f64,
        altitude: f32,
        ve_north: f32,
        ve_east: f32,
        ve_up: f32,
        true_heading: f32,
    ) -> Self {
        Self {
            latitude,
            longitude,
            altitude: altitude as f64,
            ve_north: ve_north as f64,
            ve_east: ve_east as f64,
            ve_up: ve_up as f64,
            true_heading: true_heading as f64,
        }
    }

    /// Every field rounded to 2 decimals
    pub fn rounded(&self) -> Self {
        Self {
            latitude: round2(self.latitude),
            longitude: round2(self.longitude),
            altitude: round2(self.altitude),
            ve_north: round2(self.ve_north),
            ve_east: round2(self.ve_east),
            ve_up: round2(self.ve_up),
            true_heading: round2(self.true_heading),
        }
    }

    /// Geodetic sanity check: finite and within latitude/longitude bounds
    pub fn is_geodetic(&self) -> bool {
        is_geodetic(self.latitude, self.longitude)
    }

    /// Horizontal speed over ground from the north/east velocity components
    pub fn ground_speed(&self) -> f64 {
        round2(self.ve_north.hypot(self.ve_east))
    }

    /// Course over ground in degrees, normalized to [0, 360)
    pub fn course_deg(&self) -> f64 {
        let deg = self.ve_east.atan2(self.ve_north).to_degrees();
        round2(deg.rem_euclid(360.0)).rem_euclid(360.0)
    }
}

/// Geodetic sanity check on a raw coordinate pair
#[inline]
pub fn is_geodetic(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}

/// Opcode 101: single-node track state
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackState101 {
    pub header: MessageHeader,
    #[serde(flatten)]
    pub kinematics: Kinematics,
    pub encoding: CoordinateEncoding,
    /// False when no hypothesis passed the sanity check and the
    /// little-endian float reading was returned anyway
    pub geodetic_ok: bool,
}

/// One 28-byte record of an opcode-104 list
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackRecord104 {
    /// Ordinal position of the record within the payload
    pub slot: u16,
    #[serde(flatten)]
    pub kinematics: Kinematics,
    pub encoding: CoordinateEncoding,
}

/// Opcode 104: multi-track list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackList104 {
    pub header: MessageHeader,
    /// Records in buffer order
    pub records: Vec<TrackRecord104>,
    /// Verbatim bytes after the header
    #[serde(skip)]
    pub raw_remainder: Vec<u8>,
}

/// Result of decoding one datagram
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "opcode")]
pub enum DecodedMessage {
    #[serde(rename = "101")]
    Track101(TrackState101),
    #[serde(rename = "104")]
    Track104(TrackList104),
}

impl DecodedMessage {
    pub fn header(&self) -> &MessageHeader {
        match self {
            DecodedMessage::Track101(state) => &state.header,
            DecodedMessage::Track104(list) => &list.header,
        }
    }

    /// Flatten into the member list pushed to the presentation layer
    pub fn members(&self) -> Vec<TrackMember> {
        match self {
            DecodedMessage::Track101(state) => {
                vec![TrackMember::from_kinematics(
                    state.header.global_id,
                    &state.kinematics,
                )]
            }
            DecodedMessage::Track104(list) => list
                .records
                .iter()
                .map(|r| TrackMember::from_kinematics(r.slot, &r.kinematics))
                .collect(),
        }
    }
}

/// Per-track view consumed by the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackMember {
    pub global_id: u16,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ve_north: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ve_east: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ve_up: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub true_heading: Option<f64>,
    /// Course over ground derived from ve_north/ve_east
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground_speed: Option<f64>,
}

impl TrackMember {
    pub fn from_kinematics(global_id: u16, k: &Kinematics) -> Self {
        let has_velocity = k.ve_north.is_finite() && k.ve_east.is_finite();
        Self {
            global_id,
            latitude: k.latitude,
            longitude: k.longitude,
            altitude: k.altitude,
            ve_north: Some(k.ve_north),
            ve_east: Some(k.ve_east),
            ve_up: Some(k.ve_up),
            true_heading: Some(k.true_heading),
            heading: has_velocity.then(|| k.course_deg()),
            ground_speed: has_velocity.then(|| k.ground_speed()),
        }
    }
}

/// Minimal position tuple kept in the latest-snapshot cache
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SnapshotEntry {
    pub global_id: u16,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl From<&TrackMember> for SnapshotEntry {
    fn from(m: &TrackMember) -> Self {
        Self {
            global_id: m.global_id,
            latitude: m.latitude,
            longitude: m.longitude,
            altitude: m.altitude,
        }
    }
}
