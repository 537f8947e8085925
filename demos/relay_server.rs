//! Relay server demo wired to the loopback transport
//!
//! Run with: cargo run --example relay_server [BIND_ADDR]
//!
//! Examples:
//!   cargo run --example relay_server                  # binds to 0.0.0.0:8000
//!   cargo run --example relay_server localhost        # binds to 127.0.0.1:8000
//!   cargo run --example relay_server 127.0.0.1:9000   # binds to 127.0.0.1:9000
//!
//! Signaling is served on ws://HOST:PORT/ws. Each connection negotiates a
//! loopback media path: a synthetic camera on the remote half pushes
//! frames in, and the demo logs the transformed frames coming back.
//!
//! Try it with a WebSocket client:
//!   {"type": "offer", "sdp": "v=0 demo"}   -> answer
//!   [255, 0, 0]                            -> marker turns red

use std::net::SocketAddr;
use std::time::Duration;

use marker_rs::{LoopbackConnector, LoopbackRemote, PixelFormat, RasterFrame, RelayServer, ServerConfig};

/// Drive one loopback remote: synthetic camera in, transformed frames out
async fn drive_remote(mut remote: LoopbackRemote) {
    let camera = remote.start_media().await;

    let producer = tokio::spawn(async move {
        let mut pts: i64 = 0;
        let mut ticker = tokio::time::interval(Duration::from_millis(100));
        loop {
            ticker.tick().await;
            let frame = RasterFrame::solid(320, 240, PixelFormat::Bgr24, [64, 64, 64], pts);
            if camera.send(frame).await.is_err() {
                break;
            }
            pts += 1;
        }
    });

    let mut frames: u64 = 0;
    while let Some(frame) = remote.recv_transformed().await {
        frames += 1;
        if frames % 50 == 0 {
            let center = (frame.height / 2 * frame.width + frame.width / 2) as usize * 3;
            let px = &frame.data[center..center + 3];
            println!(
                "received {} transformed frames, center pixel (BGR) = {:?}",
                frames, px
            );
        }
    }

    producer.abort();
    println!("remote finished after {} frames", frames);
}

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

    let bind_addr = match args.get(1) {
        Some(addr_str) => match parse_bind_addr(addr_str) {
            Ok(addr) => addr,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => "0.0.0.0:8000".parse().unwrap(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("marker_rs=debug".parse()?),
        )
        .init();

    let (connector, mut remotes) = LoopbackConnector::channel();

    tokio::spawn(async move {
        while let Some(remote) = remotes.recv().await {
            tokio::spawn(drive_remote(remote));
        }
    });

    let config = ServerConfig::default().bind(bind_addr);
    println!("Signaling on ws://{}{}", config.bind_addr, config.signaling_path);

    let server = RelayServer::new(config, connector);

    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
            println!("\nShutting down...");
        })
        .await?;

    Ok(())
}
