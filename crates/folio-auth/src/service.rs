//! Authentication service: login, bearer-token resolution and
//! password changes.

use chrono::Utc;
use folio_core::error::{FolioError, FolioResult};
use folio_core::models::role::{CreateRole, PermissionMatrix, Role};
use folio_core::models::user::{CreateUser, UpdateUser, User};
use folio_core::repository::{RoleRepository, UserRepository};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::gate::Actor;
use crate::password;
use crate::token;

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed JWT access token.
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    pub actor: Actor,
}

/// Input for self-registration.
#[derive(Debug)]
pub struct RegisterInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Role given to self-registered accounts.
pub const DEFAULT_SIGNUP_ROLE: &str = "subscriber";

/// Authentication service.
///
/// Generic over repository implementations so that the auth layer
/// has no dependency on the database crate.
pub struct AuthService<U: UserRepository, R: RoleRepository> {
    user_repo: U,
    role_repo: R,
    config: AuthConfig,
}

impl<U: UserRepository, R: RoleRepository> AuthService<U, R> {
    pub fn new(user_repo: U, role_repo: R, config: AuthConfig) -> Self {
        Self {
            user_repo,
            role_repo,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Create an account under [`DEFAULT_SIGNUP_ROLE`] and log it in.
    ///
    /// When the role has not been seeded it is created with an empty
    /// permission matrix, which admits nothing.
    pub async fn register(&self, input: RegisterInput) -> FolioResult<LoginOutput> {
        if input.first_name.trim().is_empty() || input.last_name.trim().is_empty() {
            return Err(FolioError::validation("first and last name are required"));
        }
        if !input.email.contains('@') {
            return Err(FolioError::validation("email address is invalid"));
        }
        password::check_policy(&input.password, self.config.min_password_length)?;

        match self.user_repo.get_by_email(&input.email).await {
            Ok(_) => {
                return Err(FolioError::conflict(format!(
                    "user {} already exists",
                    input.email.trim().to_lowercase()
                )));
            }
            Err(FolioError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let role = match self.role_repo.get_by_name(DEFAULT_SIGNUP_ROLE).await {
            Ok(role) => role,
            Err(FolioError::NotFound { .. }) => {
                warn!(role = DEFAULT_SIGNUP_ROLE, "Signup role missing, creating it");
                self.role_repo
                    .create(CreateRole {
                        name: DEFAULT_SIGNUP_ROLE.into(),
                        description: "Subscriber role".into(),
                        permissions: PermissionMatrix::default(),
                    })
                    .await?
            }
            Err(e) => return Err(e),
        };

        let user = self
            .user_repo
            .create(CreateUser {
                first_name: input.first_name.trim().to_string(),
                last_name: input.last_name.trim().to_string(),
                email: input.email,
                password: input.password,
                role_id: role.id,
            })
            .await?;
        let user = self
            .user_repo
            .update(
                user.id,
                UpdateUser {
                    last_login_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await?;

        let access_token = token::issue_access_token(user.id, &role.name, &self.config)?;
        info!(user_id = %user.id, role = %role.name, "User registered");

        Ok(LoginOutput {
            access_token,
            expires_in: self.config.access_token_lifetime_secs,
            actor: Actor::new(user, role),
        })
    }

    /// Authenticate with email + password and issue an access token.
    ///
    /// An unknown email and a wrong password fail identically. An
    /// inactive account is rejected even when the password matches.
    pub async fn login(&self, input: LoginInput) -> FolioResult<LoginOutput> {
        let user = match self.user_repo.get_by_email(&input.email).await {
            Ok(u) => u,
            Err(FolioError::NotFound { .. }) => {
                warn!(email = %input.email, "Login failed: unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        if !self.password_matches(&user, &input.password)? {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        if !user.is_active {
            warn!(user_id = %user.id, "Login failed: account inactive");
            return Err(AuthError::AccountInactive.into());
        }

        let role = self.role_of(&user).await?;
        let user = self
            .user_repo
            .update(
                user.id,
                UpdateUser {
                    last_login_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await?;

        let access_token = token::issue_access_token(user.id, &role.name, &self.config)?;
        info!(user_id = %user.id, role = %role.name, "User logged in");

        Ok(LoginOutput {
            access_token,
            expires_in: self.config.access_token_lifetime_secs,
            actor: Actor::new(user, role),
        })
    }

    /// Resolve a raw access token to a live, active actor.
    ///
    /// The role is always reloaded from storage so permission edits
    /// take effect without reissuing tokens.
    pub async fn authenticate(&self, access_token: &str) -> FolioResult<Actor> {
        let claims = token::decode_access_token(access_token, &self.config).inspect_err(|e| {
            warn!(error = %e, "Rejected access token");
        })?;
        let user_id = claims.user_id()?;

        let user = match self.user_repo.get_by_id(user_id).await {
            Ok(u) => u,
            Err(FolioError::NotFound { .. }) => {
                warn!(%user_id, "Token subject no longer exists");
                return Err(AuthError::UserNotFound.into());
            }
            Err(e) => return Err(e),
        };

        if !user.is_active {
            warn!(%user_id, "Token presented for inactive account");
            return Err(AuthError::AccountInactive.into());
        }

        let role = self.role_of(&user).await?;
        Ok(Actor::new(user, role))
    }

    /// Like [`authenticate`](Self::authenticate), starting from an
    /// `Authorization` header value of the form `Bearer <token>`.
    pub async fn authenticate_bearer(&self, header: Option<&str>) -> FolioResult<Actor> {
        let token = header
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;
        self.authenticate(token).await
    }

    /// Change a user's password after verifying the current one.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> FolioResult<()> {
        let user = self.user_repo.get_by_id(user_id).await?;

        if !self.password_matches(&user, current_password)? {
            warn!(%user_id, "Password change rejected: wrong current password");
            return Err(AuthError::InvalidCredentials.into());
        }
        password::check_policy(new_password, self.config.min_password_length)?;

        self.user_repo
            .update(
                user_id,
                UpdateUser {
                    password: Some(new_password.to_string()),
                    ..Default::default()
                },
            )
            .await?;

        info!(%user_id, "Password changed");
        Ok(())
    }

    fn password_matches(&self, user: &User, candidate: &str) -> Result<bool, AuthError> {
        password::verify_password(candidate, &user.password_hash, self.config.pepper.as_deref())
    }

    /// A user whose role record is gone cannot act at all.
    async fn role_of(&self, user: &User) -> FolioResult<Role> {
        match self.role_repo.get_by_id(user.role_id).await {
            Ok(role) => Ok(role),
            Err(FolioError::NotFound { .. }) => {
                warn!(user_id = %user.id, role_id = %user.role_id, "User has no role");
                Err(AuthError::UserNotFound.into())
            }
            Err(e) => Err(e),
        }
    }
}
