//! shardpir-server binary
//!
//! Usage:
//!   shardpir-server init-config --out pir.json                 # presence, S = 20
//!   shardpir-server init-config --variant value --out pir.json # value, S = W = 20
//!   shardpir-server init-config --variant value --shard-width 300 --degree 8192 --out pir.json
//!   shardpir-server stats --config pir.json --dataset keys.json
//!   shardpir-server respond --config pir.json --dataset keys.json --query q.bin --out r.bin

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shardpir_core::constants::{DEFAULT_KEY_DOMAIN, DEFAULT_SHARD_WIDTH, DEFAULT_VALUE_WIDTH};
use shardpir_core::{CryptoParams, Dataset, PirConfig};
use shardpir_server::{create_shared_state, ServerState};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VariantArg {
    Presence,
    Value,
}

#[derive(Parser, Debug)]
#[command(name = "shardpir-server")]
#[command(about = "Sharded single-server PIR responder")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a configuration file with a recorded hash
    InitConfig {
        #[arg(long, default_value = "presence")]
        variant: VariantArg,

        #[arg(long, default_value_t = DEFAULT_SHARD_WIDTH)]
        shard_width: usize,

        /// Bytes per key (value variant only)
        #[arg(long, default_value_t = DEFAULT_VALUE_WIDTH)]
        value_width: usize,

        #[arg(long, default_value_t = DEFAULT_KEY_DOMAIN)]
        key_domain: u64,

        /// Ring degree; raise it when `S*W + 1` exceeds the default slot count
        #[arg(long)]
        degree: Option<usize>,

        #[arg(long)]
        out: PathBuf,
    },

    /// Load a dataset and print store statistics as JSON
    Stats {
        #[arg(long)]
        config: PathBuf,

        #[arg(long)]
        dataset: Option<PathBuf>,
    },

    /// Answer one encoded query file
    Respond {
        #[arg(long)]
        config: PathBuf,

        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Encoded query envelope
        #[arg(long)]
        query: PathBuf,

        /// Where to write the encoded response envelope
        #[arg(long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("shardpir_server=info".parse()?))
        .init();

    let args = Args::parse();

    match args.command {
        Command::InitConfig {
            variant,
            shard_width,
            value_width,
            key_domain,
            degree,
            out,
        } => {
            let mut config = match variant {
                VariantArg::Presence => PirConfig::presence(shard_width),
                VariantArg::Value => PirConfig::with_values(shard_width, value_width),
            }
            .with_key_domain(key_domain);
            if let Some(degree) = degree {
                config = config.with_crypto(CryptoParams {
                    degree,
                    ..CryptoParams::default()
                });
            }
            let config = config.with_hash();

            config.validate().context("configuration rejected")?;
            config.save(&out)?;
            tracing::info!(path = %out.display(), hash = ?config.config_hash, "Config written");
        }

        Command::Stats { config, dataset } => {
            let state = build_state(&config, dataset.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&state.stats())?);
        }

        Command::Respond {
            config,
            dataset,
            query,
            out,
        } => {
            let state = create_shared_state(build_state(&config, dataset.as_deref())?);

            let query_bytes = std::fs::read(&query)
                .with_context(|| format!("reading query {}", query.display()))?;
            let response_bytes = state.read().await.process_query_bytes(&query_bytes)?;
            std::fs::write(&out, &response_bytes)?;

            tracing::info!(bytes = response_bytes.len(), path = %out.display(), "Response written");
        }
    }

    Ok(())
}

fn build_state(config_path: &Path, dataset_path: Option<&Path>) -> anyhow::Result<ServerState> {
    let config = PirConfig::load(config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    let mut state = ServerState::from_config(config)?;

    if let Some(path) = dataset_path {
        let dataset = Dataset::load(path)
            .with_context(|| format!("loading dataset {}", path.display()))?;
        state.load_dataset(&dataset)?;
    }

    Ok(state)
}
