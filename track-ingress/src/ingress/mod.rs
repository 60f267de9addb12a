//! Telemetry ingress: socket, receive loop, snapshot cache and delivery

pub mod receiver;
pub mod sink;
pub mod snapshot;

pub use receiver::{Ingress, IngressStats, LinkState};
pub use sink::{ChannelSink, SinkSet, TrackSink, UdpForwarder};
pub use snapshot::SnapshotCell;
