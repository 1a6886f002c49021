//! Server configuration read from `FOLIO_*` environment variables.

use std::path::PathBuf;

use folio_auth::AuthConfig;
use folio_db::DbConfig;
use folio_db::seed::BootstrapAdmin;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has invalid value {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub db: DbConfig,
    pub auth: AuthConfig,
    /// Created at startup when `FOLIO_ADMIN_EMAIL` is set.
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Unset keys
    /// fall back to the `Default` of the section they belong to.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db_defaults = DbConfig::default();
        let db = DbConfig {
            url: lookup("FOLIO_DB_URL").unwrap_or(db_defaults.url),
            namespace: lookup("FOLIO_DB_NAMESPACE").unwrap_or(db_defaults.namespace),
            database: lookup("FOLIO_DB_DATABASE").unwrap_or(db_defaults.database),
            username: lookup("FOLIO_DB_USER").unwrap_or(db_defaults.username),
            password: lookup("FOLIO_DB_PASSWORD").unwrap_or(db_defaults.password),
        };

        let auth_defaults = AuthConfig::default();
        let auth = AuthConfig {
            jwt_private_key_pem: read_pem(&lookup, "FOLIO_JWT_PRIVATE_KEY_FILE")?,
            jwt_public_key_pem: read_pem(&lookup, "FOLIO_JWT_PUBLIC_KEY_FILE")?,
            access_token_lifetime_secs: parse_or(
                &lookup,
                "FOLIO_ACCESS_TOKEN_TTL_SECS",
                auth_defaults.access_token_lifetime_secs,
            )?,
            jwt_issuer: lookup("FOLIO_JWT_ISSUER").unwrap_or(auth_defaults.jwt_issuer),
            pepper: lookup("FOLIO_PASSWORD_PEPPER").filter(|p| !p.is_empty()),
            min_password_length: parse_or(
                &lookup,
                "FOLIO_MIN_PASSWORD_LENGTH",
                auth_defaults.min_password_length,
            )?,
        };

        let bootstrap_admin = match lookup("FOLIO_ADMIN_EMAIL") {
            Some(email) => Some(BootstrapAdmin {
                first_name: lookup("FOLIO_ADMIN_FIRST_NAME").unwrap_or_else(|| "Admin".into()),
                last_name: lookup("FOLIO_ADMIN_LAST_NAME").unwrap_or_else(|| "User".into()),
                email,
                password: lookup("FOLIO_ADMIN_PASSWORD")
                    .ok_or(ConfigError::Missing("FOLIO_ADMIN_PASSWORD"))?,
            }),
            None => None,
        };

        Ok(Self {
            db,
            auth,
            bootstrap_admin,
        })
    }
}

fn read_pem(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<String, ConfigError> {
    let path = PathBuf::from(lookup(key).ok_or(ConfigError::Missing(key))?);
    std::fs::read_to_string(&path).map_err(|source| ConfigError::Io { path, source })
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn key_files() -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(format!("folio-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let private = dir.join("private.pem");
        let public = dir.join("public.pem");
        std::fs::write(&private, "PRIVATE").unwrap();
        std::fs::write(&public, "PUBLIC").unwrap();
        (private, public)
    }

    #[test]
    fn key_files_are_required() {
        let err = ServerConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("FOLIO_JWT_PRIVATE_KEY_FILE")));
    }

    #[test]
    fn unset_values_fall_back_to_defaults() {
        let (private, public) = key_files();
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("FOLIO_JWT_PRIVATE_KEY_FILE", private.to_str().unwrap()),
            ("FOLIO_JWT_PUBLIC_KEY_FILE", public.to_str().unwrap()),
            ("FOLIO_DB_URL", "db.internal:8000"),
        ]))
        .unwrap();

        assert_eq!(config.db.url, "db.internal:8000");
        assert_eq!(config.db.namespace, "folio");
        assert_eq!(config.auth.jwt_private_key_pem, "PRIVATE");
        assert_eq!(config.auth.access_token_lifetime_secs, 900);
        assert!(config.bootstrap_admin.is_none());
    }

    #[test]
    fn bad_numbers_and_half_configured_admin_are_rejected() {
        let (private, public) = key_files();
        let base = [
            ("FOLIO_JWT_PRIVATE_KEY_FILE", private.to_str().unwrap()),
            ("FOLIO_JWT_PUBLIC_KEY_FILE", public.to_str().unwrap()),
        ];

        let mut pairs = base.to_vec();
        pairs.push(("FOLIO_ACCESS_TOKEN_TTL_SECS", "soon"));
        let err = ServerConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "FOLIO_ACCESS_TOKEN_TTL_SECS",
                ..
            }
        ));

        let mut pairs = base.to_vec();
        pairs.push(("FOLIO_ADMIN_EMAIL", "admin@example.com"));
        let err = ServerConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("FOLIO_ADMIN_PASSWORD")));
    }
}
