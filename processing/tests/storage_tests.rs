mod test_utils;

use std::sync::Arc;

use common::{
    config::{ExporterConfig, ImporterConfig, OutputFormat},
    test_helpers::{TRANSACTIONS_CSV_HEADER, WALLETS_CSV_HEADER},
    write_fixture,
};
use processing::{
    ProcessingError,
    aggregator::portfolio_kpis,
    executable_utils::run_processor,
    model::ScoringOutput,
    storage::{DatasetSource, FileDatasetSource, FileResultSink, ResultSink},
};
use mocks::create_mock_dataset_source;
use test_utils::*;

fn exporter(dir: &std::path::Path, format: OutputFormat, with_kpis: bool) -> ExporterConfig {
    ExporterConfig {
        scored_transactions_path: dir.join("out/scored"),
        wallet_summaries_path: dir.join("out/summaries"),
        kpis_path: with_kpis.then(|| dir.join("out/kpis.json")),
        format,
    }
}

fn scored_sample() -> (std::collections::HashMap<String, processing::model::Wallet>, ScoringOutput) {
    let wallets = wallet_set([wallet("YOUNG", 1, "US"), seasoned("A"), seasoned("IDLE")]);
    let transactions = numbered(vec![
        tx("YOUNG", "A")
            .amount(50_000.0)
            .tags(&["new_wallet_large_outbound", "mixing_like_outbound"])
            .fraud()
            .build(),
        tx("A", "YOUNG").chain("BTC").build(),
    ]);
    let output = reference_processor().process(&wallets, &transactions).unwrap();
    (wallets, output)
}

#[tokio::test]
async fn file_source_reads_both_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let config = ImporterConfig {
        wallets_path: write_fixture(
            dir.path(),
            "wallets.csv",
            &format!("{WALLETS_CSV_HEADER}\nW1,3,US,0\nW2,400,DE,1\n"),
        ),
        transactions_path: write_fixture(
            dir.path(),
            "transactions.csv",
            &format!("{TRANSACTIONS_CSV_HEADER}\nTX_1,2024-05-01 00:00:00,W1,W2,10,ETH,transfer,0,\n"),
        ),
    };

    let source = FileDatasetSource::new(&config);

    assert_eq!(source.load_wallets().await.unwrap().len(), 2);
    assert_eq!(source.load_transactions().await.unwrap().len(), 1);
}

#[tokio::test]
async fn missing_input_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let config = ImporterConfig {
        wallets_path: dir.path().join("nope.csv"),
        transactions_path: dir.path().join("nope.csv"),
    };

    let err = FileDatasetSource::new(&config).load_wallets().await.unwrap_err();
    assert!(matches!(err, ProcessingError::Io { ref path, .. } if path.ends_with("nope.csv")));
    assert!(err.to_string().contains("nope.csv"));
}

#[tokio::test]
async fn csv_output_has_explainable_rows() {
    let dir = tempfile::tempdir().unwrap();
    let config = exporter(dir.path(), OutputFormat::Csv, false);
    let sink = FileResultSink::new(config.clone());
    let (wallets, output) = scored_sample();

    sink.save_scored(&output.scored).await.unwrap();
    sink.save_summaries(&output.summaries, &wallets).await.unwrap();
    sink.save_kpis(&portfolio_kpis(&output.scored, &output.summaries))
        .await
        .unwrap();
    sink.commit().await.unwrap();

    let scored = std::fs::read_to_string(&config.scored_transactions_path).unwrap();
    let mut lines = scored.lines();
    assert_eq!(
        lines.next().unwrap(),
        "tx_id,timestamp,from_wallet,to_wallet,chain,amount,tx_type,is_fraud_pattern,pattern_tags,risk_score,risk_bucket,triggered_rules"
    );
    let first = lines.next().unwrap();
    assert!(first.starts_with("TX_000000,2024-03-01T12:00:00+00:00,YOUNG,A,ETH,50000.0,transfer,1,"));
    assert!(first.contains("new_wallet_large_outbound;mixing_like_outbound"));
    assert!(first.ends_with(",40.0,MEDIUM,New wallet abuse"));

    let summaries = std::fs::read_to_string(&config.wallet_summaries_path).unwrap();
    let rows: Vec<&str> = summaries.lines().collect();
    assert_eq!(rows.len(), 4);
    assert!(rows[0].starts_with("wallet_id,wallet_risk_bucket,max_risk_score"));
    // Sorted by wallet id, idle wallets included.
    assert!(rows[1].starts_with("A,"));
    assert!(rows[2].starts_with("IDLE,LOW,0.0,0.0,0,0,0.0,400,US,0"));
    assert!(rows[3].starts_with("YOUNG,MEDIUM,40.0,40.0,1,1,1.0,1,US,0"));

    assert!(!dir.path().join("out/kpis.json").exists());
}

#[tokio::test]
async fn json_output_round_trips_through_serde() {
    let dir = tempfile::tempdir().unwrap();
    let config = exporter(dir.path(), OutputFormat::Json, true);
    let sink = FileResultSink::new(config.clone());
    let (wallets, output) = scored_sample();
    let kpis = portfolio_kpis(&output.scored, &output.summaries);

    sink.save_scored(&output.scored).await.unwrap();
    sink.save_summaries(&output.summaries, &wallets).await.unwrap();
    sink.save_kpis(&kpis).await.unwrap();
    sink.commit().await.unwrap();

    let scored: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&config.scored_transactions_path).unwrap()).unwrap();
    assert_eq!(scored[0]["risk_bucket"], "MEDIUM");
    assert_eq!(scored[0]["from_wallet"], "YOUNG");
    assert_eq!(scored[1]["triggered_rules"][0], "High-risk chain or country");

    let summaries: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&config.wallet_summaries_path).unwrap()).unwrap();
    assert_eq!(summaries["IDLE"]["tx_count"], 0);
    assert_eq!(summaries["YOUNG"]["country"], "US");

    let written: serde_json::Value =
        serde_json::from_slice(&std::fs::read(config.kpis_path.unwrap()).unwrap()).unwrap();
    assert_eq!(written["total_transactions"], 2);
    assert_eq!(written["bucket_counts"]["MEDIUM"], 1);
    assert_eq!(written["bucket_counts"]["HIGH"], 0);
}

#[tokio::test]
async fn saves_are_invisible_until_commit() {
    let dir = tempfile::tempdir().unwrap();
    let config = exporter(dir.path(), OutputFormat::Csv, true);
    let (wallets, output) = scored_sample();

    {
        let sink = FileResultSink::new(config.clone());
        sink.save_scored(&output.scored).await.unwrap();
        sink.save_summaries(&output.summaries, &wallets).await.unwrap();
        assert!(!config.scored_transactions_path.exists());
        assert!(!config.wallet_summaries_path.exists());
    }

    // Dropping the sink removes the staged files.
    assert_eq!(std::fs::read_dir(dir.path().join("out")).unwrap().count(), 0);
}

#[tokio::test]
async fn failed_write_leaves_no_partial_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = exporter(dir.path(), OutputFormat::Csv, true);
    config.wallet_summaries_path = dir.path().join("out/taken");
    std::fs::create_dir_all(&config.wallet_summaries_path).unwrap();

    let source = create_mock_dataset_source(
        wallet_set([seasoned("A"), seasoned("B")]),
        numbered(vec![tx("A", "B").build()]),
    );

    let err = run_processor(
        &reference_processor(),
        Arc::new(source),
        Arc::new(FileResultSink::new(config.clone())),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ProcessingError::Io { ref path, .. } if path.ends_with("taken")));
    assert!(!config.scored_transactions_path.exists());
    assert!(!config.kpis_path.unwrap().exists());
    let entries: Vec<_> = std::fs::read_dir(dir.path().join("out"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("taken")]);
}
