use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use dcc_core::config::{load_campaign_config_from_env, CampaignConfig};
use dcc_core::data::{load_data_store_from_env, DataStore};
use dcc_sim::engine::EngineConfig;
use dcc_worker::error::WorkerError;
use dcc_worker::{ipc, worker};

#[derive(Parser, Debug)]
#[command(author, version, about = "Campaign engine worker speaking JSON lines on stdin/stdout", long_about = None)]
struct Args {
    /// RNG seed for new campaigns
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Reference data JSON (defaults to $DCC_DATA_STORE, then the builtin tables)
    #[arg(long)]
    data: Option<PathBuf>,

    /// Campaign config JSON (defaults to $DCC_CAMPAIGN_CONFIG, then the builtin config)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(target: "dcc::worker", error = %err, "worker failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), WorkerError> {
    let data = match &args.data {
        Some(path) => DataStore::from_file(path)?,
        None => load_data_store_from_env()?,
    };
    let campaign = match &args.config {
        Some(path) => CampaignConfig::from_file(path)?,
        None => load_campaign_config_from_env()?,
    };

    let handle = worker::spawn_worker(
        EngineConfig {
            seed: args.seed,
            campaign,
        },
        Arc::new(data),
    )?;

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    let served = ipc::serve(stdin.lock(), &mut stdout, &handle)?;
    tracing::info!(target: "dcc::worker", served, "input closed");
    handle.shutdown()
}
