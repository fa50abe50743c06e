//! Agency exerciser binary
//!
//! Sweeps all start-order × topology × delay combinations against an
//! external agent binary. A long run can be resumed with `--skip N`, where
//! N counts combinations in unfiltered enumeration order.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use agency_torture::{HarnessConfig, Orchestrator};

#[derive(Parser)]
#[command(name = "agency-torture")]
#[command(about = "Combinatorial startup exerciser for a three-node agency", version)]
struct Cli {
    /// Combinations (in unfiltered enumeration order) to skip before
    /// execution begins
    #[arg(long, default_value_t = 0)]
    skip: u64,

    /// Path to the agent executable
    #[arg(long, default_value = "./build/bin/arangod")]
    agent: PathBuf,

    /// JavaScript startup directory handed to the agent
    #[arg(long, default_value = "./js")]
    js_dir: PathBuf,

    /// Host the agents bind and advertise on
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Port of node 0; node k listens on base-port + k
    #[arg(long, default_value_t = 4001)]
    base_port: u16,

    /// Directory under which per-case agent state is created
    #[arg(long, default_value = ".")]
    work_root: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    if !cli.agent.exists() {
        anyhow::bail!("agent executable not found: {}", cli.agent.display());
    }

    let config = HarnessConfig {
        agent_binary: cli.agent,
        js_startup_dir: cli.js_dir,
        host: cli.host,
        base_port: cli.base_port,
        work_root: cli.work_root,
        ..HarnessConfig::default()
    };

    Orchestrator::new(config).run(cli.skip).await;
    Ok(())
}
