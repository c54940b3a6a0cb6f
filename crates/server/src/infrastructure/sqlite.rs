//! SQLite-backed box storage.
//!
//! Atomicity is delegated to SQLite transactions. The schema mirrors the
//! original deployment: a `users` table plus `box_entries` keyed by the
//! generated entry id, with charge moves stored as a comma-separated string.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pokebox_domain::{BoxEntry, DexNumber, EntryId, UserId};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::infrastructure::ports::{BoxRepo, RepoError};

const ENTITY: &str = "BoxEntry";

pub struct SqliteBoxRepo {
    pool: SqlitePool,
}

impl SqliteBoxRepo {
    /// Open (creating if needed) the database file and ensure the schema.
    pub async fn new(db_path: &Path) -> Result<Self, RepoError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| RepoError::storage("create_db_dir", e))?;
            }
        }
        let url = format!("sqlite:{}?mode=rwc", db_path.display());
        let pool = SqlitePool::connect(&url)
            .await
            .map_err(|e| RepoError::storage("connect", e))?;
        Self::with_pool(pool).await
    }

    /// Build on an existing pool. Used by tests with `sqlite::memory:`.
    pub async fn with_pool(pool: SqlitePool) -> Result<Self, RepoError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::storage("ensure_schema", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS box_entries (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id),
                dex INTEGER NOT NULL,
                nickname TEXT,
                sprite TEXT NOT NULL,
                cp INTEGER NOT NULL,
                quick_move TEXT,
                charge_moves TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::storage("ensure_schema", e))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_box_entries_user ON box_entries(user_id)",
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::storage("ensure_schema", e))?;

        Ok(Self { pool })
    }
}

fn serialize_charge_moves(moves: &[String]) -> String {
    moves
        .iter()
        .filter(|m| !m.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepoError::serialization(format!("bad timestamp {raw:?}: {e}")))
}

fn row_to_entry(row: &SqliteRow) -> Result<BoxEntry, RepoError> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let dex: i64 = row.get("dex");
    let cp: i64 = row.get("cp");
    let charge_raw: String = row.get("charge_moves");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(BoxEntry {
        id: EntryId::from_str(&id).map_err(RepoError::serialization)?,
        user_id: UserId::new(user_id).map_err(RepoError::serialization)?,
        dex: DexNumber::new(u32::try_from(dex).map_err(RepoError::serialization)?),
        nickname: row.get("nickname"),
        sprite: row.get("sprite"),
        cp: u32::try_from(cp).map_err(RepoError::serialization)?,
        quick_move: row.get("quick_move"),
        charge_moves: charge_raw
            .split(',')
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect(),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl BoxRepo for SqliteBoxRepo {
    async fn add(&self, entry: &BoxEntry) -> Result<(), RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::storage("add", e))?;

        sqlx::query("INSERT OR IGNORE INTO users (id) VALUES (?)")
            .bind(entry.user_id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::storage("add", e))?;

        let insert = sqlx::query(
            r#"
            INSERT INTO box_entries
                (id, user_id, dex, nickname, sprite, cp, quick_move, charge_moves, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.id.to_string())
        .bind(entry.user_id.as_str())
        .bind(i64::from(entry.dex.value()))
        .bind(&entry.nickname)
        .bind(&entry.sprite)
        .bind(i64::from(entry.cp))
        .bind(&entry.quick_move)
        .bind(serialize_charge_moves(&entry.charge_moves))
        .bind(entry.created_at.to_rfc3339())
        .bind(entry.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await;

        match insert {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(RepoError::duplicate(ENTITY, entry.id));
            }
            Err(e) => return Err(RepoError::storage("add", e)),
        }

        tx.commit().await.map_err(|e| RepoError::storage("add", e))
    }

    async fn get(&self, id: EntryId) -> Result<BoxEntry, RepoError> {
        let row = sqlx::query("SELECT * FROM box_entries WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::storage("get", e))?
            .ok_or_else(|| RepoError::not_found(ENTITY, id))?;
        row_to_entry(&row)
    }

    async fn list(&self, user_id: &UserId) -> Result<Vec<BoxEntry>, RepoError> {
        let rows =
            sqlx::query("SELECT * FROM box_entries WHERE user_id = ? ORDER BY created_at, id")
                .bind(user_id.as_str())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| RepoError::storage("list", e))?;
        rows.iter().map(row_to_entry).collect()
    }

    async fn update(&self, entry: &BoxEntry) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE box_entries SET
                nickname = ?, sprite = ?, dex = ?, cp = ?,
                quick_move = ?, charge_moves = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&entry.nickname)
        .bind(&entry.sprite)
        .bind(i64::from(entry.dex.value()))
        .bind(i64::from(entry.cp))
        .bind(&entry.quick_move)
        .bind(serialize_charge_moves(&entry.charge_moves))
        .bind(entry.updated_at.to_rfc3339())
        .bind(entry.id.to_string())
        .bind(entry.user_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::storage("update", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found(ENTITY, entry.id));
        }
        Ok(())
    }

    async fn remove(&self, id: EntryId) -> Result<BoxEntry, RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::storage("remove", e))?;

        let row = sqlx::query("SELECT * FROM box_entries WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| RepoError::storage("remove", e))?
            .ok_or_else(|| RepoError::not_found(ENTITY, id))?;
        let removed = row_to_entry(&row)?;

        sqlx::query("DELETE FROM box_entries WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::storage("remove", e))?;

        tx.commit()
            .await
            .map_err(|e| RepoError::storage("remove", e))?;
        Ok(removed)
    }
}
