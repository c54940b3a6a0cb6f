//! PokeBox server library.
//!
//! This crate contains all server-side code for the PokeBox backend.
//!
//! ## Structure
//!
//! - `use_cases/` - Business logic (the box service and validation rules)
//! - `infrastructure/` - Storage backends, catalog loader, clock, configuration
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
