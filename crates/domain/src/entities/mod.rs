pub mod box_entry;
pub mod species;

pub use box_entry::{BoxEntry, EntryDraft};
pub use species::{Move, Species};
