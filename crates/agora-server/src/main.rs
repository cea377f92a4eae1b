//! Agora server binary.
//!
//! # Usage
//!
//! ```bash
//! agora-server --bind 0.0.0.0:9090
//! ```

use std::time::Duration;

use agora_server::{Server, ServerRuntimeConfig};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Agora presence and signaling server
#[derive(Parser, Debug)]
#[command(name = "agora-server")]
#[command(about = "Presence, room, and voice-signaling server for shared spaces")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:9090")]
    bind: String,

    /// Seconds a new connection may take to identify itself
    #[arg(long, default_value = "10")]
    hello_timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("agora server starting");

    let config = ServerRuntimeConfig {
        bind_address: args.bind,
        hello_timeout: Duration::from_secs(args.hello_timeout),
    };

    let server = Server::bind(config).await?;

    tracing::info!("listening on {}", server.local_addr()?);

    server.run().await?;

    Ok(())
}
