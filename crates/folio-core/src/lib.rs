//! Folio Core: shared domain models, error taxonomy, repository
//! traits and slug derivation.

pub mod error;
pub mod models;
pub mod repository;
pub mod slug;
