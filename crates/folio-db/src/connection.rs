//! Store connection for the Folio server.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::schema::run_migrations;

/// Where the CMS data lives. Defaults match a local development store.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// `host:port`, optionally written as `ws://host:port/`.
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "folio".into(),
            database: "cms".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl DbConfig {
    /// The `host:port` the WebSocket engine dials.
    pub fn address(&self) -> Result<&str, DbError> {
        let url = self.url.trim();
        if url.contains("://") && !url.starts_with("ws://") {
            return Err(DbError::Config(format!(
                "unsupported store URL {url:?}, expected host:port or ws://host:port"
            )));
        }
        let address = url.strip_prefix("ws://").unwrap_or(url).trim_end_matches('/');
        if address.is_empty() {
            return Err(DbError::Config("store URL is empty".into()));
        }
        Ok(address)
    }

    fn validate(&self) -> Result<(), DbError> {
        for (key, value) in [("namespace", &self.namespace), ("database", &self.database)] {
            if value.trim().is_empty() {
                return Err(DbError::Config(format!("store {key} is empty")));
            }
        }
        Ok(())
    }
}

/// Store client shared by every repository. Clone it freely.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        config.validate()?;
        let address = config.address()?;
        info!(
            %address,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to SurrealDB"
        );

        let db = Surreal::new::<Ws>(address).await?;
        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;
        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        info!("Connected to SurrealDB");
        Ok(Self { db })
    }

    /// Bring the connected database up to the latest schema version.
    pub async fn migrate(&self) -> Result<(), DbError> {
        run_migrations(&self.db).await
    }

    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_url(url: &str) -> DbConfig {
        DbConfig {
            url: url.into(),
            ..Default::default()
        }
    }

    #[test]
    fn address_accepts_bare_and_ws_forms() {
        assert_eq!(with_url("db:8000").address().unwrap(), "db:8000");
        assert_eq!(with_url("ws://db:8000/").address().unwrap(), "db:8000");
        assert_eq!(with_url(" 10.0.0.5:8000 ").address().unwrap(), "10.0.0.5:8000");
    }

    #[test]
    fn address_rejects_other_schemes_and_blanks() {
        for url in ["wss://db:8000", "http://db:8000", "", "ws://"] {
            assert!(
                matches!(with_url(url).address(), Err(DbError::Config(_))),
                "{url:?}"
            );
        }
    }

    #[test]
    fn blank_namespace_is_rejected() {
        let config = DbConfig {
            namespace: "  ".into(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(DbError::Config(_))));
        assert!(DbConfig::default().validate().is_ok());
    }
}
