//! Category domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum CategoryStatus {
    #[default]
    Active,
    Hidden,
}

/// A node of the self-referencing category hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    /// URL-safe key derived from `name`; unique across all categories.
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub sort_order: i64,
    pub is_featured: bool,
    pub status: CategoryStatus,
    /// Reference path of the uploaded image, if any.
    pub image: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repository input. The slug is derived by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub sort_order: i64,
    pub is_featured: bool,
    pub status: CategoryStatus,
    pub image: Option<String>,
    pub created_by: Option<Uuid>,
}

/// Partial update. The parent link is not part of it: reparenting goes
/// through a dedicated, cycle-checked path.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub slug: Option<String>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub description: Option<Option<String>>,
    pub sort_order: Option<i64>,
    pub is_featured: Option<bool>,
    pub status: Option<CategoryStatus>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub image: Option<Option<String>>,
}

/// One observed parent link: `id` was a child of `parent_id` (`None`
/// for top level) when the link was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
}

/// A category with its children populated, as rendered by tree views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryNode>,
}
