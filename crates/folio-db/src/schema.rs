//! Schema definitions and migration runner for SurrealDB.
//!
//! Tables are SCHEMAFULL. UUIDs are stored as strings; enums as strings
//! guarded by ASSERT. Parent links and foreign keys are plain string
//! columns, never record links, so the hierarchy is an arena keyed by id.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial_schema",
        sql: SCHEMA_V1,
    },
    Migration {
        version: 2,
        name: "category_sibling_order",
        sql: SCHEMA_V2,
    },
    Migration {
        version: 3,
        name: "hierarchy_revision_and_products",
        sql: SCHEMA_V3,
    },
];

// -----------------------------------------------------------------------
// Schema v1: initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Roles
-- =======================================================================
DEFINE TABLE role SCHEMAFULL;
DEFINE FIELD name ON TABLE role TYPE string;
DEFINE FIELD description ON TABLE role TYPE string DEFAULT '';
DEFINE FIELD permissions ON TABLE role TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_role_name ON TABLE role COLUMNS name UNIQUE;

-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD first_name ON TABLE user TYPE string;
DEFINE FIELD last_name ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD role_id ON TABLE user TYPE string;
DEFINE FIELD is_active ON TABLE user TYPE bool DEFAULT true;
DEFINE FIELD last_login_at ON TABLE user TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;
DEFINE INDEX idx_user_role ON TABLE user COLUMNS role_id;

-- =======================================================================
-- Categories (self-referencing hierarchy)
-- =======================================================================
DEFINE TABLE category SCHEMAFULL;
DEFINE FIELD name ON TABLE category TYPE string;
DEFINE FIELD slug ON TABLE category TYPE string;
DEFINE FIELD description ON TABLE category TYPE option<string>;
DEFINE FIELD parent_id ON TABLE category TYPE option<string>;
DEFINE FIELD sort_order ON TABLE category TYPE int DEFAULT 0;
DEFINE FIELD is_featured ON TABLE category TYPE bool DEFAULT false;
DEFINE FIELD status ON TABLE category TYPE string \
    ASSERT $value IN ['Active', 'Hidden'];
DEFINE FIELD image ON TABLE category TYPE option<string>;
DEFINE FIELD created_by ON TABLE category TYPE option<string>;
DEFINE FIELD created_at ON TABLE category TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE category TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_category_slug ON TABLE category COLUMNS slug UNIQUE;
DEFINE INDEX idx_category_parent ON TABLE category COLUMNS parent_id;

-- =======================================================================
-- Articles (content referencing a category)
-- =======================================================================
DEFINE TABLE article SCHEMAFULL;
DEFINE FIELD title ON TABLE article TYPE string;
DEFINE FIELD slug ON TABLE article TYPE string;
DEFINE FIELD body ON TABLE article TYPE string;
DEFINE FIELD excerpt ON TABLE article TYPE option<string>;
DEFINE FIELD category_id ON TABLE article TYPE string;
DEFINE FIELD author_id ON TABLE article TYPE string;
DEFINE FIELD status ON TABLE article TYPE string \
    ASSERT $value IN ['Draft', 'Published', 'Archived'];
DEFINE FIELD published_at ON TABLE article TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE article TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE article TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_article_slug ON TABLE article COLUMNS slug UNIQUE;
DEFINE INDEX idx_article_category ON TABLE article COLUMNS category_id;
";

// -----------------------------------------------------------------------
// Schema v2: sibling ordering index for tree rendering
// -----------------------------------------------------------------------

const SCHEMA_V2: &str = "\
DEFINE INDEX idx_category_sibling_order ON TABLE category \
    COLUMNS parent_id, sort_order;
";

// -----------------------------------------------------------------------
// Schema v3: hierarchy revision row and products
// -----------------------------------------------------------------------

const SCHEMA_V3: &str = "\
DEFINE TABLE category_tree SCHEMAFULL;
DEFINE FIELD revision ON TABLE category_tree TYPE int DEFAULT 0;

DEFINE TABLE product SCHEMAFULL;
DEFINE FIELD name ON TABLE product TYPE string;
DEFINE FIELD slug ON TABLE product TYPE string;
DEFINE FIELD description ON TABLE product TYPE string;
DEFINE FIELD short_description ON TABLE product TYPE option<string>;
DEFINE FIELD price ON TABLE product TYPE int ASSERT $value >= 0;
DEFINE FIELD sale_price ON TABLE product TYPE option<int> \
    ASSERT $value = NONE OR $value >= 0;
DEFINE FIELD sku ON TABLE product TYPE string;
DEFINE FIELD quantity ON TABLE product TYPE int DEFAULT 0 ASSERT $value >= 0;
DEFINE FIELD is_available ON TABLE product TYPE bool DEFAULT true;
DEFINE FIELD is_featured ON TABLE product TYPE bool DEFAULT false;
DEFINE FIELD category_id ON TABLE product TYPE string;
DEFINE FIELD featured_image ON TABLE product TYPE option<string>;
DEFINE FIELD created_at ON TABLE product TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE product TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_product_slug ON TABLE product COLUMNS slug UNIQUE;
DEFINE INDEX idx_product_sku ON TABLE product COLUMNS sku UNIQUE;
DEFINE INDEX idx_product_category ON TABLE product COLUMNS category_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Apply every migration newer than the recorded schema version.
///
/// The `_migration` table is created on first use. Each applied
/// migration is recorded with its version so a restart skips it.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    let pending = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > current_version);

    for migration in pending {
        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );

        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "v{} '{}' failed: {e}",
                migration.version, migration.name
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "could not record v{}: {e}",
                    migration.version
                ))
            })?;
    }

    info!(
        version = MIGRATIONS.last().map(|m| m.version).unwrap_or(0),
        "Schema up to date"
    );

    Ok(())
}

/// Raw DDL of the first schema version.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_strictly_increase() {
        for pair in MIGRATIONS.windows(2) {
            assert!(pair[0].version < pair[1].version);
        }
    }

    #[test]
    fn uniqueness_is_enforced_by_indexes() {
        for index in [
            "idx_category_slug ON TABLE category COLUMNS slug UNIQUE",
            "idx_role_name ON TABLE role COLUMNS name UNIQUE",
            "idx_user_email ON TABLE user COLUMNS email UNIQUE",
            "idx_article_slug ON TABLE article COLUMNS slug UNIQUE",
        ] {
            assert!(SCHEMA_V1.contains(index), "missing index: {index}");
        }
        for index in [
            "idx_product_slug ON TABLE product COLUMNS slug UNIQUE",
            "idx_product_sku ON TABLE product COLUMNS sku UNIQUE",
        ] {
            assert!(SCHEMA_V3.contains(index), "missing index: {index}");
        }
    }
}
