//! Registry Proxy
//!
//! One endpoint in front of many package and artifact registries.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client: GET /cr/ghcr/v2/nginxinc/nginx-unprivileged/manifests/latest
//!      │
//!      ▼
//!   ┌──────────┐   ┌──────────┐   ┌────────────────────────────┐
//!   │   http   │──▶│ security │──▶│          routing           │
//!   │  server  │   │  policy  │   │ registry ─▶ rewrite engine │
//!   └──────────┘   └──────────┘   └─────────────┬──────────────┘
//!                                               │ https://ghcr.io + /v2/nginxinc/...
//!                                               ▼
//!                                 ┌────────────────────────────┐
//!                                 │ reqwest client + retries   │──▶ Upstream registry
//!                                 └────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;

use registry_proxy::config::{load_config, ProxyConfig};
use registry_proxy::lifecycle;
use registry_proxy::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "registry-proxy")]
#[command(about = "Unified reverse proxy for package and artifact registries", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults apply when omitted).
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the proxy (default)
    Serve,
    /// List configured platforms as JSON
    Platforms,
    /// Print the upstream URL a client path is forwarded to
    Resolve {
        /// Client path, e.g. /gh/rust-lang/rust/archive/master.zip
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            init_logging(&config.observability);
            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                config = ?cli.config,
                "registry-proxy starting"
            );
            lifecycle::run(config).await?;
            tracing::info!("Shutdown complete");
        }
        Commands::Platforms => {
            let engine = lifecycle::build_engine(&config)?;
            let platforms: Vec<_> = engine
                .registry()
                .entries()
                .into_iter()
                .map(|entry| {
                    json!({
                        "key": entry.key(),
                        "origin": entry.origin(),
                        "prefix": entry.routing_prefix(),
                        "rule": engine.rule_for(entry.key()),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&platforms)?);
        }
        Commands::Resolve { path } => {
            let engine = lifecycle::build_engine(&config)?;
            match engine.route(&path) {
                Some(target) => println!("{}", target.url()),
                None => {
                    eprintln!("Unknown platform for path: {}", path);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
