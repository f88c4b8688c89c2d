//! nametree-indexer entry point.
//!
//! Reads one JSON registry log per line from stdin and applies the
//! stream in order against the configured entity store.

use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use nametree_indexer::config::{IndexerConfig, StoreBackend};
use nametree_indexer::domain::{EventBus, LabelSource, NoLabels};
use nametree_indexer::ingest;
use nametree_indexer::persistence::{EntityStore, MemoryStore, PostgresStore};
use nametree_indexer::service::{NamespaceFilter, RegistryService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = IndexerConfig::from_env();
    tracing::info!(
        suffix = %config.indexed_suffix,
        backend = ?config.store_backend,
        "starting nametree-indexer"
    );

    let event_bus = EventBus::new(config.event_bus_capacity);
    let filter = NamespaceFilter::new(&config.indexed_suffix);

    // Label reversal needs an external preimage oracle; without one,
    // unresolved labels surface as bracketed hex placeholders.
    match config.store_backend {
        StoreBackend::Memory => {
            let store = MemoryStore::new();
            run(store, NoLabels, filter, event_bus).await?;
        }
        StoreBackend::Postgres => {
            let store = PostgresStore::connect(&config).await?;
            store.ensure_schema().await?;
            run(store, NoLabels, filter, event_bus).await?;
        }
    }

    Ok(())
}

async fn run<S: EntityStore, L: LabelSource>(
    store: S,
    labels: L,
    filter: NamespaceFilter,
    event_bus: EventBus,
) -> anyhow::Result<()> {
    let service = RegistryService::new(store, labels, filter, event_bus);
    service.bootstrap().await?;

    let stdin = BufReader::new(tokio::io::stdin());
    let stats = ingest::run_jsonl(stdin, &service).await?;
    tracing::info!(
        applied = stats.applied,
        skipped = stats.skipped,
        dropped = stats.dropped,
        "indexer finished"
    );
    Ok(())
}
