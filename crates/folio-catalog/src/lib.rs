//! Folio Catalog: the category hierarchy: arena snapshot, cycle
//! checks, safe deletion and nested tree views.

pub mod service;
pub mod tree;

pub use service::{CategoryService, NewCategory};
pub use tree::{CategoryTree, TreeDepth};
