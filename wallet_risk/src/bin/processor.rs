use std::sync::Arc;

use anyhow::Context;
use processing::{
    executable_utils::{initialize_executable, run_processor},
    storage::{FileDatasetSource, FileResultSink},
};
use wallet_risk::build_processor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = initialize_executable()?;

    let processor = build_processor(&config).context("invalid scoring configuration")?;
    let source = Arc::new(FileDatasetSource::new(&config.importer));
    let sink = Arc::new(FileResultSink::new(config.exporter.clone()));

    let result = run_processor(&processor, source, sink)
        .await
        .context("scoring run failed")?;

    tracing::info!(
        transactions = result.kpis.total_transactions,
        wallets = result.output.summaries.len(),
        "Processor finished"
    );
    Ok(())
}
