//! Ingress against a fake source on the loopback interface

use crate::datagrams::{track_101, track_104};
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use track_ingress::Error;
use track_ingress::config::{DecoderConfig, SourceConfig};
use track_ingress::ingress::{ChannelSink, Ingress, LinkState, SinkSet};

/// Fake tracking source bound to an ephemeral loopback port
fn fake_source() -> UdpSocket {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    socket
}

fn source_config(source: &UdpSocket) -> SourceConfig {
    SourceConfig {
        host: "127.0.0.1".to_string(),
        port: source.local_addr().unwrap().port(),
        bind_address: "127.0.0.1:0".to_string(),
        greeting: "HELLO".to_string(),
        read_timeout_ms: 200,
    }
}

/// Wait for the greeting and return the ingress address it came from
fn accept_greeting(source: &UdpSocket) -> SocketAddr {
    let mut buf = [0u8; 64];
    let (n, peer) = source.recv_from(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"HELLO");
    peer
}

#[test]
fn test_greeting_then_datagram() {
    let source = fake_source();
    let (sink, rx) = ChannelSink::new(4);
    let mut sinks = SinkSet::new();
    sinks.add(Box::new(sink));

    let mut ingress = Ingress::new(source_config(&source), DecoderConfig::default(), sinks);
    ingress.connect().unwrap();
    assert_eq!(ingress.state(), LinkState::Connected);

    let peer = accept_greeting(&source);
    assert_eq!(Some(peer), ingress.local_addr());

    source
        .send_to(&track_101(7, [37.5, -122.3, 1000.0, 10.0, 5.0, 0.0, 90.0]), peer)
        .unwrap();

    let mut message = None;
    for _ in 0..20 {
        message = ingress.poll_once().unwrap();
        if message.is_some() {
            break;
        }
    }
    let message = message.expect("datagram not received");
    assert_eq!(message.header().global_id, 7);

    let pushed = rx.try_recv().unwrap();
    assert_eq!(pushed[0].latitude, 37.5);
    assert_eq!(ingress.latest()[0].longitude, -122.3);

    ingress.disconnect();
    assert_eq!(ingress.state(), LinkState::Disconnected);
    assert!(ingress.local_addr().is_none());
}

#[test]
fn test_run_until_stopped() {
    let source = fake_source();
    let (sink, rx) = ChannelSink::new(16);
    let mut sinks = SinkSet::new();
    sinks.add(Box::new(sink));

    let mut ingress = Ingress::new(source_config(&source), DecoderConfig::default(), sinks);
    let late_subscriber = ingress.snapshot();
    ingress.connect().unwrap();
    let peer = accept_greeting(&source);

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    let feeder = thread::spawn(move || {
        source.send_to(&track_104(3), peer).unwrap();
        source.send_to(b"garbage", peer).unwrap();
        source.send_to(&track_104(2), peer).unwrap();
        thread::sleep(Duration::from_millis(500));
        r.store(false, Ordering::Relaxed);
    });

    ingress.run(&running).unwrap();
    feeder.join().unwrap();

    assert_eq!(ingress.state(), LinkState::Disconnected);
    let stats = ingress.stats();
    assert_eq!(stats.received, 3);
    assert_eq!(stats.decoded_104, 2);
    assert_eq!(stats.dropped, 1);

    assert_eq!(rx.try_recv().unwrap().len(), 3);
    assert_eq!(rx.try_recv().unwrap().len(), 2);
    assert_eq!(late_subscriber.latest().len(), 2);
}

#[test]
fn test_socket_error_disconnects_once() {
    // Free a loopback port so nothing answers there
    let closed = fake_source();
    let config = source_config(&closed);
    drop(closed);

    let mut ingress = Ingress::new(config, DecoderConfig::default(), SinkSet::new());
    ingress.connect().unwrap();
    assert_eq!(ingress.state(), LinkState::Connected);

    // The greeting draws an ICMP port-unreachable, reported on the next recv
    match ingress.run(&AtomicBool::new(true)) {
        Err(Error::Io(e)) => assert_eq!(e.kind(), ErrorKind::ConnectionRefused),
        other => panic!("expected connection refused, got {:?}", other),
    }
    assert_eq!(ingress.state(), LinkState::Disconnected);
    assert!(ingress.local_addr().is_none());

    // Reported once; further receives need a new connect
    assert!(matches!(ingress.poll_once(), Err(Error::NotConnected)));
    assert_eq!(ingress.stats().received, 0);
}
