//! Application state and composition.
//!
//! The single place where concrete implementations are chosen and wired
//! together. Tests build the same `App` with mock or in-memory ports.

use std::sync::Arc;

use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::config::{AppConfig, StorageBackend};
use crate::infrastructure::json_store::JsonBoxRepo;
use crate::infrastructure::pokedex::Pokedex;
use crate::infrastructure::ports::{BoxRepo, CatalogPort, ClockPort};
use crate::infrastructure::sqlite::SqliteBoxRepo;
use crate::use_cases::BoxService;

/// Main application state.
///
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub boxes: BoxService,
    pub catalog: Arc<dyn CatalogPort>,
}

impl App {
    /// Wire the application from configuration: pick the repository via the
    /// backend selector, load the catalog, build the service.
    pub async fn build(config: &AppConfig) -> anyhow::Result<Arc<Self>> {
        let repo = build_repository(config).await?;
        let catalog: Arc<dyn CatalogPort> = Arc::new(Pokedex::from_file(&config.pokedex_path));
        Ok(Self::with_ports(repo, catalog))
    }

    /// Assemble from already-constructed ports. Used by `build` and by tests.
    pub fn with_ports(repo: Arc<dyn BoxRepo>, catalog: Arc<dyn CatalogPort>) -> Arc<Self> {
        let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());
        Arc::new(Self {
            boxes: BoxService::new(repo, catalog.clone(), clock),
            catalog,
        })
    }
}

/// Repository factory keyed on the configured backend.
pub async fn build_repository(config: &AppConfig) -> anyhow::Result<Arc<dyn BoxRepo>> {
    let repo: Arc<dyn BoxRepo> = match config.backend {
        StorageBackend::Json => {
            tracing::info!(path = %config.json_path.display(), "Using JSON box store");
            Arc::new(JsonBoxRepo::new(config.json_path.clone())?)
        }
        StorageBackend::Sqlite => {
            tracing::info!(path = %config.database_path.display(), "Using SQLite box store");
            Arc::new(SqliteBoxRepo::new(&config.database_path).await?)
        }
    };
    Ok(repo)
}
