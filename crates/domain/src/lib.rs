pub mod entities;
pub mod error;
pub mod ids;

pub use entities::{BoxEntry, EntryDraft, Move, Species};
pub use error::DomainError;
pub use ids::{DexNumber, EntryId, UserId};
