use clap::Parser;
use miette::{IntoDiagnostic, Result};
use moni::application::dispatcher::EventDispatcher;
use moni::config::AppConfig;
use moni::domain::ports::CustomerStoreRef;
use moni::infrastructure::in_memory::InMemoryProvider;
use moni::interfaces::csv::event_reader::{EventReader, ScriptEvent};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input event script CSV file
    input: PathBuf,

    /// Path to persistent customer database (optional). If provided, uses RocksDB.
    #[cfg(feature = "storage-rocksdb")]
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().into_diagnostic()?;

    // The in-memory provider simulates the messaging/payment side; the
    // customer store can optionally be persistent.
    let provider = InMemoryProvider::new();

    #[cfg(feature = "storage-rocksdb")]
    let store: CustomerStoreRef = match &cli.db_path {
        Some(path) => Arc::new(
            moni::infrastructure::rocksdb::RocksDbStore::open(path).into_diagnostic()?,
        ),
        None => Arc::new(provider.clone()),
    };
    #[cfg(not(feature = "storage-rocksdb"))]
    let store: CustomerStoreRef = Arc::new(provider.clone());

    let dispatcher = EventDispatcher::new(
        store,
        Arc::new(provider.clone()),
        Arc::new(provider.clone()),
        Arc::new(provider.clone()),
        config.workflow(),
    );
    info!(ussd_code = %config.ussd_code, "engine ready, replaying events");

    // Replay the script in order, printing a transcript of everything a
    // subscriber would see.
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = EventReader::new(file);
    for event_result in reader.events() {
        match event_result.and_then(ScriptEvent::into_inbound) {
            Ok(event) => {
                if let Some(menu) = dispatcher.dispatch(event).await {
                    let marker = if menu.is_terminal { "menu/end" } else { "menu" };
                    println!("[{marker}] {}", menu.text);
                }
                for message in provider.drain_outbox().await {
                    println!(
                        "[{} -> {}] {}",
                        message.channel.kind,
                        message.customer,
                        message.body.content(),
                    );
                }
            }
            Err(e) => {
                eprintln!("Error reading event: {}", e);
            }
        }
    }

    Ok(())
}
