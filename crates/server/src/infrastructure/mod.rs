//! Infrastructure - storage backends, catalog loader, clock, configuration.

pub mod clock;
pub mod config;
pub mod json_store;
pub mod pokedex;
pub mod ports;
pub mod sqlite;
