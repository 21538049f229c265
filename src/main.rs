//! backend-proxy
//!
//! Forwards dashboard API calls to the REST backend.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────────┐
//!                          │                  BACKEND PROXY                    │
//!                          │                                                   │
//!   Browser (HTTPS)        │  ┌─────────┐    ┌──────────┐    ┌─────────────┐   │
//!   ───────────────────────┼─▶│  http   │───▶│ routing  │───▶│  upstream   │───┼──▶ REST API (HTTP)
//!   /api/proxy/{*path}     │  │ server  │    │  target  │    │   client    │   │    BACKEND_API_URL
//!                          │  └─────────┘    └──────────┘    └──────┬──────┘   │
//!                          │       ▲                                │          │
//!   ◀──────────────────────┼───────┴──── response.rs ◀──────────────┘          │
//!   relay / 502 / 503      │                                                   │
//!                          │  config · observability · lifecycle · security    │
//!                          └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use backend_proxy::lifecycle::startup::{self, StartupOptions};

#[derive(Parser)]
#[command(name = "backend-proxy")]
#[command(about = "Forwarding proxy for the dashboard REST API", long_about = None)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listener address, overriding the configuration file.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    startup::run(StartupOptions {
        config_path: args.config,
        bind_address: args.bind,
    })
    .await?;

    Ok(())
}
