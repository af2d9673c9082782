//! # Sensor Gateway
//!
//! Authenticates browser-resident sensors, accepts their event batches and
//! routes them to the configured outputs.
//!
//! ```text
//! sensor ──POST /install──► key ─► verifier ─► token
//! sensor ──POST /events───► token ─► parse ─► OutputRouter ─┬─► stdout
//!                                                           └─► <dir>/<group>/*.json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gateway_runtime::commands::{generate_key, generate_secret};
use gateway_runtime::logging::init_logging;
use gateway_runtime::{server, GatewayConfig};
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "gateway-runtime", version, about = "Sensor event gateway")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the gateway
    Server {
        /// Path to the TOML configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Generate an install key and its verifier
    Key {
        /// Group the key installs into. Random if omitted
        #[arg(short, long)]
        group: Option<Uuid>,
    },
    /// Generate a token signing secret
    Secret,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Server { config } => {
            init_logging()?;
            let config = GatewayConfig::load(&config)
                .with_context(|| format!("Failed to load configuration from {}", config.display()))?;
            info!("Starting sensor gateway v{}", env!("CARGO_PKG_VERSION"));
            server::run(config).await
        }
        Command::Key { group } => {
            println!("{}", generate_key(group)?);
            Ok(())
        }
        Command::Secret => {
            println!("{}", generate_secret()?);
            Ok(())
        }
    }
}
