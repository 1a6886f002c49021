//! Folio Auth: password verification, JWT issuance/validation, the
//! authorization gate and role administration.

pub mod config;
pub mod error;
pub mod gate;
pub mod password;
pub mod roles;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use gate::{Actor, authorize_permission, authorize_role};
pub use roles::RoleService;
pub use service::{AuthService, LoginInput, LoginOutput, RegisterInput};
pub use token::AccessTokenClaims;
