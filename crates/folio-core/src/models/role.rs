//! Role domain model and its permission matrix.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the role that bypasses the permission matrix.
pub const SUPER_ROLE: &str = "admin";

/// Resource → action → granted.
///
/// Lookups never fail: an absent resource or action is a denial.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct PermissionMatrix(BTreeMap<String, BTreeMap<String, bool>>);

impl PermissionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a matrix from `(resource, [(action, granted)])` rows.
    pub fn from_rows<'a>(
        rows: impl IntoIterator<Item = (&'a str, &'a [(&'a str, bool)])>,
    ) -> Self {
        let mut matrix = Self::new();
        for (resource, actions) in rows {
            for (action, granted) in actions {
                matrix.set(resource, action, *granted);
            }
        }
        matrix
    }

    /// `true` only when the entry exists and is explicitly granted.
    pub fn allows(&self, resource: &str, action: &str) -> bool {
        self.0
            .get(resource)
            .and_then(|actions| actions.get(action))
            .copied()
            .unwrap_or(false)
    }

    pub fn set(&mut self, resource: &str, action: &str, granted: bool) {
        self.0
            .entry(resource.to_string())
            .or_default()
            .insert(action.to_string(), granted);
    }

    pub fn grant(&mut self, resource: &str, action: &str) {
        self.set(resource, action, true);
    }

    pub fn revoke(&mut self, resource: &str, action: &str) {
        self.set(resource, action, false);
    }

    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.0)
            .unwrap_or_else(|_| serde_json::Value::Object(Default::default()))
    }

    /// Parses a stored JSON object; non-boolean leaves are treated as
    /// not granted rather than rejected.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let mut matrix = Self::new();
        if let Some(resources) = value.as_object() {
            for (resource, actions) in resources {
                if let Some(actions) = actions.as_object() {
                    for (action, granted) in actions {
                        matrix.set(resource, action, granted.as_bool().unwrap_or(false));
                    }
                }
            }
        }
        matrix
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub permissions: PermissionMatrix,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn is_super(&self) -> bool {
        self.name == SUPER_ROLE
    }

    pub fn has_permission(&self, resource: &str, action: &str) -> bool {
        self.is_super() || self.permissions.allows(resource, action)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRole {
    pub name: String,
    pub description: String,
    pub permissions: PermissionMatrix,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateRole {
    pub name: Option<String>,
    pub description: Option<String>,
    pub permissions: Option<PermissionMatrix>,
}
