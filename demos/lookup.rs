//! In-process private lookup
//!
//! Builds a server from a dataset, then looks keys up through the full
//! encrypted round trip. Query and response only cross as bytes.
//!
//! Usage:
//!   cargo run --example lookup -- 9846819001 8846819001
//!   cargo run --example lookup -- --values 8065889001 8065889002
//!   cargo run --example lookup -- --dataset keys.json 42

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shardpir::client::ClientSession;
use shardpir::core::{Dataset, PirConfig, Variant};
use shardpir::server::ServerState;

#[derive(Parser, Debug)]
#[command(name = "lookup")]
#[command(about = "Private single-key lookup against an in-process server")]
struct Args {
    /// Keys to look up
    #[arg(required = true)]
    keys: Vec<u64>,

    /// Use the value variant with the built-in sample entries
    #[arg(long)]
    values: bool,

    /// Dataset file to serve instead of the built-in sample
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Config file (defaults: S = 20, W = 20)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("shardpir_server=info".parse()?))
        .init();

    let args = Args::parse();

    let dataset = match &args.dataset {
        Some(path) => Dataset::load(path).with_context(|| format!("loading {}", path.display()))?,
        None if args.values => Dataset::from_entries([
            (9846819001, "Abelet Winston"),
            (8065889001, "Ammu"),
        ]),
        None => Dataset::from_keys([9846819001, 9846819002, 9846819003, 9846819006, 9846819007]),
    };

    let config = match &args.config {
        Some(path) => PirConfig::load(path)?,
        None => match dataset.variant() {
            Variant::Presence => PirConfig::default(),
            Variant::Value => PirConfig::default_values(),
        },
    };

    let mut server = ServerState::from_config(config.clone())?;
    server.load_dataset(&dataset)?;
    let client = ClientSession::from_config(&config)?;

    for key in args.keys {
        let query = client.build_query_bytes(key)?;
        let response = server.process_query_bytes(&query)?;
        let result = client.decode_response_bytes(&response)?;

        println!(
            "{} -> {:?} (query {} bytes, response {} bytes)",
            key,
            result,
            query.len(),
            response.len()
        );
    }

    Ok(())
}
