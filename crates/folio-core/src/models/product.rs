//! Product domain model: catalog items that reference a category.
//!
//! Prices are integer amounts in the currency's minor unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub short_description: Option<String>,
    pub price: i64,
    pub sale_price: Option<i64>,
    pub sku: String,
    pub quantity: i64,
    pub is_available: bool,
    pub is_featured: bool,
    pub category_id: Uuid,
    pub featured_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Price a buyer pays: the sale price when one is set.
    pub fn effective_price(&self) -> i64 {
        self.sale_price.unwrap_or(self.price)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub short_description: Option<String>,
    pub price: i64,
    pub sale_price: Option<i64>,
    pub sku: String,
    pub quantity: i64,
    pub category_id: Uuid,
    pub featured_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    /// `Some(None)` clears the sale price.
    pub sale_price: Option<Option<i64>>,
    pub quantity: Option<i64>,
    pub is_available: Option<bool>,
    pub is_featured: Option<bool>,
    pub category_id: Option<Uuid>,
}
