//! Chain Guard - pre-signing transaction risk scorer
//!
//! Usage:
//!   chain_guard <transaction.json | -> [--chain]
//!
//! Reads a transaction view as JSON (from a file, or stdin with `-`),
//! prints the risk summary to stderr and the analysis as JSON to stdout.
//! With `--chain`, recipient age and fee rate are prefetched from the
//! configured Solana RPC endpoint first.

use chain_guard::utils::constants::{APP_NAME, APP_VERSION};
use chain_guard::{
    ChainSnapshot, GuardConfig, SolanaChainState, TelemetryCollector, ThreatDetector,
    TransactionView, TransferDecoder,
};

use clap::Parser;
use eyre::{Result, WrapErr};
use std::io::Read;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "chain_guard", version)]
#[command(about = "Score a Solana transaction before signing", long_about = None)]
struct Cli {
    /// Transaction JSON file, or - for stdin
    input: String,

    /// Prefetch recipient age and fee rate from the configured RPC endpoint
    #[arg(long)]
    chain: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let input = cli.input.as_str();
    let raw = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .wrap_err("Failed to read transaction from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input)
            .wrap_err_with(|| format!("Failed to read transaction file {}", input))?
    };
    let tx: TransactionView =
        serde_json::from_str(&raw).wrap_err("Transaction JSON is malformed")?;

    info!("🛡️ {} v{} starting", APP_NAME, APP_VERSION);

    // Load configuration
    let config = GuardConfig::default();
    let telemetry = Arc::new(TelemetryCollector::new());
    let detector = ThreatDetector::from_config(&config)?.with_observer(telemetry.clone());

    let model = detector.model_info();
    info!("🤖 Model v{} | {}", model.version, model.architecture);

    let programs = tx.known_programs();
    if !programs.is_empty() {
        info!("📦 Programs: {}", programs.join(", "));
    }
    for transfer in TransferDecoder::decode_all(&tx.instructions) {
        info!("💸 Transfer: {:.9} SOL -> {}", transfer.sol(), transfer.to);
    }

    let snapshot = if cli.chain {
        info!("📡 Prefetching chain state from {}", config.rpc_url);
        SolanaChainState::from_config(&config)?.snapshot(&tx).await
    } else {
        ChainSnapshot::new()
    };

    let analysis = detector.analyze_with_state(&tx, &snapshot)?;

    eprintln!("{}", analysis.summary());
    println!("{}", serde_json::to_string_pretty(&analysis)?);

    let stats = telemetry.get_stats();
    info!(
        "📊 Analyzed: {} | Avg latency: {:.3}ms",
        stats.total_analyzed, stats.avg_latency_ms
    );

    Ok(())
}
