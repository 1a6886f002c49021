//! Domain models for Folio.
//!
//! These are the core types shared across all crates.

pub mod article;
pub mod category;
pub mod product;
pub mod role;
pub mod user;
