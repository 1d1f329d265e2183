//! `reel-render`: render a file of requests and print the batch summary.

use anyhow::{bail, Context, Result};
use clap::Parser;
use reel_models::RenderRequest;
use reel_worker::{init_tracing, render_batch, MoodCatalog, RenderOrchestrator, WorkerConfig};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "reel-render", version, about = "Render narrated vertical shorts")]
struct Cli {
    /// JSON file holding one request or an array of requests
    requests: PathBuf,

    /// Jobs to run at once (capped by REEL_MAX_CONCURRENCY)
    #[arg(long)]
    max_concurrency: Option<usize>,

    /// Directory finished renders are written to
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RequestFile {
    Many(Vec<RenderRequest>),
    One(RenderRequest),
}

impl RequestFile {
    fn into_vec(self) -> Vec<RenderRequest> {
        match self {
            RequestFile::Many(requests) => requests,
            RequestFile::One(request) => vec![request],
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        eprintln!("rustls crypto provider already installed");
    }

    dotenvy::dotenv().ok();
    init_tracing("reel=info");

    let cli = Cli::parse();

    let mut config = WorkerConfig::from_env();
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    config.validate()?;
    info!(?config, "reel-render starting");

    let raw = std::fs::read_to_string(&cli.requests)
        .with_context(|| format!("reading {}", cli.requests.display()))?;
    let requests = serde_json::from_str::<RequestFile>(&raw)
        .with_context(|| format!("parsing {}", cli.requests.display()))?
        .into_vec();
    if requests.is_empty() {
        bail!("{} contains no requests", cli.requests.display());
    }

    let host_cap = config.max_concurrency;
    let max_concurrency = cli.max_concurrency.unwrap_or(host_cap);
    let catalog = Arc::new(MoodCatalog::load(&config)?);
    let orchestrator = Arc::new(RenderOrchestrator::new(config, catalog)?);

    let summary = render_batch(orchestrator, requests, max_concurrency, host_cap).await;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if summary.failed > 0 {
        warn!(failed = summary.failed, total = summary.total, "some renders failed");
        std::process::exit(1);
    }
    Ok(())
}
