//! One-shot importer: load a JSON array of entry drafts into the SQLite store.
//!
//! Usage:
//!   import-boxes <boxes.json> [user_id]
//!
//! Entries run through the same service validation as live requests; ones
//! that fail are logged and skipped.

use std::str::FromStr;
use std::sync::Arc;

use pokebox_domain::{EntryDraft, UserId};
use pokebox_server::infrastructure::clock::SystemClock;
use pokebox_server::infrastructure::config::AppConfig;
use pokebox_server::infrastructure::pokedex::Pokedex;
use pokebox_server::infrastructure::ports::{CatalogPort, ClockPort};
use pokebox_server::infrastructure::sqlite::SqliteBoxRepo;
use pokebox_server::use_cases::BoxService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "import_boxes=info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let json_path = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("usage: import-boxes <boxes.json> [user_id]"))?;
    let user_id = UserId::from_str(&args.next().unwrap_or_else(|| "local_user".into()))?;

    let config = AppConfig::from_env()?;
    let repo = Arc::new(SqliteBoxRepo::new(&config.database_path).await?);
    let catalog: Arc<dyn CatalogPort> = Arc::new(Pokedex::from_file(&config.pokedex_path));
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());
    let service = BoxService::new(repo, catalog, clock);

    let bytes = std::fs::read(&json_path)?;
    let drafts: Vec<EntryDraft> = serde_json::from_slice(&bytes)?;

    let mut imported = 0usize;
    let mut failed = 0usize;
    for draft in &drafts {
        match service.add_entry(&user_id, draft).await {
            Ok(entry) => {
                imported += 1;
                tracing::info!(entry_id = %entry.id, dex = %entry.dex, "Imported entry");
            }
            Err(e) => {
                failed += 1;
                tracing::warn!(error = %e, draft = ?draft, "Skipped entry");
            }
        }
    }

    tracing::info!(imported, failed, total = drafts.len(), "Import complete");
    Ok(())
}
