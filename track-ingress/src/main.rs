//! Track Ingress - telemetry decoder daemon
//!
//! ## Usage
//!
//! ```bash
//! # Defaults (source 127.0.0.1:6101)
//! track-ingress
//!
//! # Config file with overrides
//! track-ingress --config /etc/track-ingress.toml --host 10.0.0.5 --port 6101
//!
//! # Decode one captured datagram offline
//! track-ingress decode 0165010000...
//! ```
//!
//! Decoded member lists are written to stdout as one JSON line each and, if
//! `publish.forward_address` is set, forwarded as length-prefixed JSON over UDP.

use clap::{Parser, Subcommand};
use crossbeam_channel::Receiver;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use track_ingress::config::AppConfig;
use track_ingress::error::{Error, Result};
use track_ingress::ingress::{ChannelSink, Ingress, SinkSet, UdpForwarder};
use track_ingress::protocol::{DecodePath, decode_with};
use track_ingress::sanitize::decode_text_best_effort;
use track_ingress::types::TrackMember;

#[derive(Parser, Debug)]
#[command(name = "track-ingress", version, about = "Tactical track telemetry decoder")]
struct Cli {
    /// TOML configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override source host
    #[arg(long)]
    host: Option<String>,

    /// Override source port
    #[arg(long)]
    port: Option<u16>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode one hex-encoded datagram and print it as JSON
    Decode {
        /// Datagram bytes as hex (whitespace ignored)
        hex: String,

        /// Use the legacy fixed-offset layout
        #[arg(long)]
        fixed_offset: bool,
    },
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(host) = &cli.host {
        config.source.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.source.port = port;
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Parse a hex string such as `01 65 01 00 1c...` into bytes
fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let digits: Vec<u8> = input
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    if digits.len() % 2 != 0 {
        return Err(Error::InvalidParameter(format!(
            "odd number of hex digits ({})",
            digits.len()
        )));
    }
    digits
        .chunks_exact(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .filter(|s| s.bytes().all(|b| b.is_ascii_hexdigit()))
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(|| {
                    Error::InvalidParameter(format!(
                        "invalid hex byte '{}'",
                        String::from_utf8_lossy(pair)
                    ))
                })
        })
        .collect()
}

fn decode_hex(hex_input: &str, fixed_offset: bool) -> Result<()> {
    let bytes = parse_hex(hex_input)?;

    let path = if fixed_offset {
        DecodePath::FixedOffset
    } else {
        DecodePath::Resolved
    };

    match decode_with(path, &bytes) {
        Ok(message) => {
            println!("{}", serde_json::to_string_pretty(&message)?);
            Ok(())
        }
        Err(e) => {
            log::error!("Text preview: {:?}", decode_text_best_effort(&bytes));
            Err(Error::Decode(e))
        }
    }
}

fn build_sinks(config: &AppConfig) -> Result<(SinkSet, Receiver<Arc<[TrackMember]>>)> {
    let mut sinks = SinkSet::new();
    let (channel, rx) = ChannelSink::new(config.publish.channel_capacity);
    sinks.add(Box::new(channel));
    if let Some(addr) = &config.publish.forward_address {
        let target: SocketAddr = addr
            .parse()
            .map_err(|e| Error::Config(format!("forward_address '{}': {}", addr, e)))?;
        sinks.add(Box::new(UdpForwarder::new(target)?));
    }
    Ok((sinks, rx))
}

/// Writes each member list as a JSON line until the ingress side hangs up
fn spawn_stdout_subscriber(rx: Receiver<Arc<[TrackMember]>>) -> Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("stdout-subscriber".to_string())
        .spawn(move || {
            for members in rx {
                match serde_json::to_string(&*members) {
                    Ok(line) => println!("{}", line),
                    Err(e) => log::warn!("Failed to serialize member list: {}", e),
                }
            }
            log::debug!("Subscriber channel closed");
        })
        .map_err(Error::Io)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    if let Some(Command::Decode { hex, fixed_offset }) = &cli.command {
        return decode_hex(hex, *fixed_offset);
    }

    log::info!("Track Ingress v{} starting...", env!("CARGO_PKG_VERSION"));
    log::info!(
        "Source: {}:{} ({:?} decode path, decompress fallback {})",
        config.source.host,
        config.source.port,
        config.decoder.path,
        if config.decoder.decompress_fallback {
            "on"
        } else {
            "off"
        }
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let (sinks, rx) = build_sinks(&config)?;
    let subscriber = spawn_stdout_subscriber(rx)?;
    let mut ingress = Ingress::new(config.source.clone(), config.decoder.clone(), sinks);

    // Connect errors are reported once; restarting is left to the supervisor
    let result = ingress.connect().and_then(|()| {
        log::info!("Track Ingress running. Press Ctrl-C to stop.");
        ingress.run(&running)
    });

    // Dropping the ingress drops the channel sender and ends the subscriber
    drop(ingress);
    if subscriber.join().is_err() {
        log::error!("Subscriber thread panicked");
    }

    log::info!("Track Ingress stopped");
    result
}
