//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the server. Everything else is concrete
//! types. Ports exist for:
//! - Box storage (JSON file vs SQLite, swapped at startup)
//! - Species catalog (file-backed Pokédex, faked in tests)
//! - Clock (for testing)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pokebox_domain::{BoxEntry, DexNumber, EntryId, Species, UserId};

// =============================================================================
// Error Types
// =============================================================================

/// Repository operation errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Entity not found - includes entity type and ID for actionable error messages.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Identifier collision on add.
    #[error("{entity_type} already exists: {id}")]
    DuplicateKey {
        entity_type: &'static str,
        id: String,
    },

    /// Storage operation failed - includes operation name for tracing.
    #[error("Storage error in {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepoError {
    /// Create a NotFound error with entity type and ID context.
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Create a DuplicateKey error with entity type and ID context.
    pub fn duplicate(entity_type: &'static str, id: impl ToString) -> Self {
        Self::DuplicateKey {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Create a Storage error with operation context.
    pub fn storage(operation: &'static str, message: impl ToString) -> Self {
        Self::Storage {
            operation,
            message: message.to_string(),
        }
    }

    /// Create a Serialization error.
    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }

    /// Check if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// =============================================================================
// Box Storage Port
// =============================================================================

/// Persistence port for box entries.
///
/// Implementations own the persisted representation exclusively; the service
/// layer never touches storage directly. Each operation is atomic with
/// respect to a single record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BoxRepo: Send + Sync {
    /// Persist a new entry. Fails with `DuplicateKey` if the id exists.
    async fn add(&self, entry: &BoxEntry) -> Result<(), RepoError>;

    /// Fetch one entry by id.
    async fn get(&self, id: EntryId) -> Result<BoxEntry, RepoError>;

    /// All entries for a user, ordered by creation time.
    async fn list(&self, user_id: &UserId) -> Result<Vec<BoxEntry>, RepoError>;

    /// Replace the stored entry with the same id. Fails with `NotFound`.
    async fn update(&self, entry: &BoxEntry) -> Result<(), RepoError>;

    /// Delete an entry and return the removed record. Fails with `NotFound`.
    async fn remove(&self, id: EntryId) -> Result<BoxEntry, RepoError>;
}

// =============================================================================
// Species Catalog Port
// =============================================================================

/// Read-only reference data mapping dex numbers to species info.
#[cfg_attr(test, mockall::automock)]
pub trait CatalogPort: Send + Sync {
    fn lookup(&self, dex: DexNumber) -> Option<Species>;
    fn all(&self) -> Vec<Species>;
    fn is_empty(&self) -> bool;
}

// =============================================================================
// Testability Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
