//! Folio Server: application entry point.

mod config;

use folio_auth::{AuthService, RoleService};
use folio_catalog::CategoryService;
use folio_core::error::FolioError;
use folio_db::repository::{
    SurrealArticleRepository, SurrealCategoryRepository, SurrealProductRepository,
    SurrealRoleRepository, SurrealUserRepository,
};
use folio_db::{DbError, DbManager, seed};
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, ServerConfig};

#[derive(Debug, Error)]
enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("database: {0}")]
    Db(#[from] DbError),

    #[error(transparent)]
    Folio(#[from] FolioError),
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .init();

    info!("Starting Folio server...");

    if let Err(e) = run().await {
        error!(error = %e, "Folio server failed to start");
        std::process::exit(1);
    }

    info!("Folio server stopped.");
}

async fn run() -> Result<(), StartupError> {
    let config = ServerConfig::from_env()?;

    let db = DbManager::connect(&config.db).await?;
    db.migrate().await?;
    let client = db.client().clone();

    let user_repo = match config.auth.pepper.clone() {
        Some(pepper) => SurrealUserRepository::with_pepper(client.clone(), pepper),
        None => SurrealUserRepository::new(client.clone()),
    };
    let role_repo = SurrealRoleRepository::new(client.clone());

    let roles = seed::seed_default_roles(&role_repo).await?;
    info!(count = roles.len(), "Default roles ready");

    if let Some(admin) = config.bootstrap_admin.clone() {
        seed::seed_admin_user(&role_repo, &user_repo, admin).await?;
    }

    let auth = AuthService::new(user_repo.clone(), role_repo.clone(), config.auth.clone());
    let role_service = RoleService::new(role_repo, user_repo);
    let categories = CategoryService::new(
        SurrealCategoryRepository::new(client.clone()),
        SurrealArticleRepository::new(client.clone()),
        SurrealProductRepository::new(client),
    );

    info!(
        issuer = %auth.config().jwt_issuer,
        roles = role_service.list().await?.len(),
        top_level_categories = categories
            .get_tree(None, folio_catalog::TreeDepth::Limited(1))
            .await?
            .len(),
        "Folio server ready"
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");

    Ok(())
}
