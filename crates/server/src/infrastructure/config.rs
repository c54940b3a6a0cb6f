//! Process configuration, read once at startup and immutable afterwards.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Which repository implementation backs the box store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Json,
    Sqlite,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "sql" | "sqlite" | "sqlalchemy" | "db" => Ok(Self::Sqlite),
            other => Err(format!("unknown storage backend: {other}")),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Immutable application configuration.
///
/// Built from the environment exactly once in `main` (or by hand in tests)
/// and passed by reference into the composition root.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: StorageBackend,
    /// Path of the JSON box store (json backend).
    pub json_path: PathBuf,
    /// Path of the SQLite database file (sqlite backend).
    pub database_path: PathBuf,
    /// Path of the Pokédex reference file. Missing file means empty catalog.
    pub pokedex_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Option<String>,
}

impl AppConfig {
    /// Read configuration from the environment.
    ///
    /// An unparseable `BOX_REPO` is an error rather than a silent fallback:
    /// picking the wrong store must not go unnoticed.
    pub fn from_env() -> anyhow::Result<Self> {
        let backend = match std::env::var("BOX_REPO") {
            Ok(raw) => raw
                .parse::<StorageBackend>()
                .map_err(|e| anyhow::anyhow!(e))?,
            Err(_) => StorageBackend::Sqlite,
        };

        let json_path = std::env::var("BOX_JSON_PATH")
            .unwrap_or_else(|_| "data/boxes.json".into())
            .into();
        let database_path = std::env::var("DATABASE_PATH")
            .unwrap_or_else(|_| "data/pokebox.db".into())
            .into();
        let pokedex_path = std::env::var("POKEDEX_PATH")
            .unwrap_or_else(|_| "data/pokedex.json".into())
            .into();

        let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("SERVER_PORT")
            .or_else(|_| std::env::var("PORT"))
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .unwrap_or(3000);

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            backend,
            json_path,
            database_path,
            pokedex_path,
            host,
            port,
            cors_allowed_origins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_selector_accepts_original_aliases() {
        assert_eq!("json".parse::<StorageBackend>(), Ok(StorageBackend::Json));
        assert_eq!("sql".parse::<StorageBackend>(), Ok(StorageBackend::Sqlite));
        assert_eq!("SQLITE".parse::<StorageBackend>(), Ok(StorageBackend::Sqlite));
        assert_eq!("sqlalchemy".parse::<StorageBackend>(), Ok(StorageBackend::Sqlite));
        assert_eq!("db".parse::<StorageBackend>(), Ok(StorageBackend::Sqlite));
        assert!("mongodb".parse::<StorageBackend>().is_err());
    }
}
