use anyhow::Context;
use clap::Parser;
use common::config::Config;
use std::{collections::HashMap, path::PathBuf, sync::Arc};
use tracing_subscriber::EnvFilter;

use crate::{
    aggregator::portfolio_kpis,
    error::ProcessingResult,
    model::{PortfolioKpis, ScoringOutput, Wallet, WalletId},
    processor::Processor,
    scorers::Scorer,
    storage::{DatasetSource, ResultSink},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to config file, defaults to wallet_risk/config/<WALLET_RISK_ENV>.yaml
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub fn default_config_path() -> PathBuf {
    let env = std::env::var("WALLET_RISK_ENV").unwrap_or_else(|_| "dev".to_string());
    PathBuf::from("wallet_risk/config").join(format!("{env}.yaml"))
}

/// Parses CLI arguments, loads the config and installs the tracing subscriber.
pub fn initialize_executable() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config_path = args.config.unwrap_or_else(default_config_path);
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    init_tracing(&config.common.log_level);
    tracing::info!(
        path = %config_path.display(),
        project = %config.common.project_name,
        "Loaded config"
    );

    Ok(config)
}

/// `RUST_LOG` wins; otherwise `default_level` is used as the filter.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed (tests, embedding applications).
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub output: ScoringOutput,
    pub kpis: PortfolioKpis,
}

/// Loads the dataset and runs the full pipeline without persisting anything.
pub async fn score_dataset<S: Scorer>(
    processor: &Processor<S>,
    source: Arc<dyn DatasetSource>,
) -> ProcessingResult<RunResult> {
    let (_, result) = load_and_score(processor, source.as_ref()).await?;
    Ok(result)
}

/// Loads, scores and persists. Nothing is published unless scoring and every
/// save succeeded.
pub async fn run_processor<S: Scorer>(
    processor: &Processor<S>,
    source: Arc<dyn DatasetSource>,
    sink: Arc<dyn ResultSink>,
) -> ProcessingResult<RunResult> {
    let (wallets, result) = load_and_score(processor, source.as_ref()).await?;

    sink.save_scored(&result.output.scored).await?;
    sink.save_summaries(&result.output.summaries, &wallets).await?;
    sink.save_kpis(&result.kpis).await?;
    sink.commit().await?;

    tracing::info!(
        transactions = result.kpis.total_transactions,
        high_risk_wallets = result.kpis.high_risk_wallets,
        "Scoring run persisted"
    );
    Ok(result)
}

async fn load_and_score<S: Scorer>(
    processor: &Processor<S>,
    source: &dyn DatasetSource,
) -> ProcessingResult<(HashMap<WalletId, Wallet>, RunResult)> {
    let wallets = source.load_wallets().await?;
    let transactions = source.load_transactions().await?;

    let output = processor.process(&wallets, &transactions)?;
    let kpis = portfolio_kpis(&output.scored, &output.summaries);

    Ok((wallets, RunResult { output, kpis }))
}
