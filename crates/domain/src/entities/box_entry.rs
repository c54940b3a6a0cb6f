//! Box entry entity - one Pokémon stored in a user's box.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{DexNumber, EntryId, UserId};

/// One record within a box.
///
/// Constructed only by the service layer after validation; the repository
/// persists what it is handed and never mutates an entry itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxEntry {
    pub id: EntryId,
    pub user_id: UserId,
    /// Species this entry is an instance of, derived from the sprite filename.
    pub dex: DexNumber,
    /// Optional user-assigned nickname; the UI falls back to the species name.
    #[serde(rename = "name")]
    pub nickname: Option<String>,
    /// Sprite filename or URL. Opaque to the backend.
    pub sprite: String,
    /// Combat power. Non-negative by construction.
    pub cp: u32,
    pub quick_move: Option<String>,
    pub charge_moves: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw request payload for add/update, before validation.
///
/// Deserialized permissively: `cp` may be absent or negative (rejected later
/// by the service), and the legacy singular `charge_move` key is accepted
/// alongside `charge_moves`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EntryDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sprite: Option<String>,
    #[serde(default)]
    pub cp: Option<i64>,
    #[serde(default)]
    pub quick_move: Option<String>,
    #[serde(default)]
    pub charge_moves: Option<Vec<String>>,
    /// Legacy single-move key kept for old clients.
    #[serde(default)]
    pub charge_move: Option<String>,
}

impl EntryDraft {
    /// Collapse `charge_moves` and the legacy `charge_move` key into one list.
    /// `charge_moves` wins when both are present.
    pub fn normalized_charge_moves(&self) -> Vec<String> {
        match (&self.charge_moves, &self.charge_move) {
            (Some(list), _) => list.iter().filter(|m| !m.is_empty()).cloned().collect(),
            (None, Some(single)) if !single.is_empty() => vec![single.clone()],
            _ => Vec::new(),
        }
    }
}
