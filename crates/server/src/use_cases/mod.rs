//! Use cases - business logic between the API layer and the storage ports.

pub mod boxes;
pub mod validation;

pub use boxes::{BoxService, ServiceError};
