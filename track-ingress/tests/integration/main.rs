//! Integration tests for track-ingress
//!
//! Datagram scenarios run against the public decode API; the loopback tests
//! stand up a fake source on 127.0.0.1 and drive a real [`Ingress`].
//!
//! ```bash
//! cargo test -p track-ingress --test integration -- --nocapture
//! ```
//!
//! [`Ingress`]: track_ingress::Ingress

mod datagrams;
mod decode_scenarios;
mod ingress_loopback;
mod sanitize_props;
