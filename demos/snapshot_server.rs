//! Snapshot server demo
//!
//! Run with: cargo run --example snapshot_server [BIND_ADDR]
//!
//! Each binary WebSocket message is one request: 3 color bytes followed by
//! a raw-container image. The reply is the same image with a centered
//! marker rectangle in the requested color. Messages shorter than 4 bytes
//! or carrying an undecodable image get no reply.
//!
//! An optional config file overrides the defaults:
//!   cargo run --example snapshot_server -- --config config.json

use std::net::SocketAddr;

use marker_rs::{RawCodec, ServerConfig, SnapshotServer};

fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    const DEFAULT_PORT: u16 = 8000;

    let normalized = arg.replace("localhost", "127.0.0.1");

    if let Ok(addr) = normalized.parse::<SocketAddr>() {
        return Ok(addr);
    }
    if let Ok(ip) = normalized.parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    Err(format!(
        "Invalid bind address: '{}'. Expected format: IP:PORT or IP or 'localhost'",
        arg
    ))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("marker_rs=debug".parse()?),
        )
        .init();

    let config = match args.get(1).map(String::as_str) {
        Some("--config") => {
            let path = args.get(2).map(String::as_str).unwrap_or("config.json");
            ServerConfig::from_json_file(path)?
        }
        Some(addr_str) => match parse_bind_addr(addr_str) {
            Ok(addr) => ServerConfig::with_addr(addr),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => ServerConfig::default(),
    };

    println!("Snapshot server on ws://{}", config.bind_addr);

    let server = SnapshotServer::new(config, RawCodec::new());

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                eprintln!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\nShutting down...");
        }
    }

    Ok(())
}
