use std::sync::Arc;

use anyhow::Context;
use processing::{
    aggregator::top_wallets,
    executable_utils::{initialize_executable, score_dataset},
    report::render_report,
    storage::FileDatasetSource,
};
use wallet_risk::build_processor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = initialize_executable()?;

    let processor = build_processor(&config).context("invalid scoring configuration")?;
    let source = Arc::new(FileDatasetSource::new(&config.importer));

    let result = score_dataset(&processor, source)
        .await
        .context("scoring run failed")?;

    let top = top_wallets(&result.output.summaries, config.processor.top_wallets);
    print!("{}", render_report(&result.kpis, &top));
    Ok(())
}
