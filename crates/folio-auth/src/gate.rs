//! Per-request authorization: the resolved actor and the two checks
//! callers run before touching a protected operation.

use folio_core::error::{FolioError, FolioResult};
use folio_core::models::role::Role;
use folio_core::models::user::User;
use tracing::debug;

/// An authenticated, active user together with its current role.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user: User,
    pub role: Role,
}

impl Actor {
    pub fn new(user: User, role: Role) -> Self {
        Self { user, role }
    }

    /// Whether the actor may perform `action` on `resource`.
    ///
    /// The super role is admitted unconditionally. Any other role needs
    /// an explicit `true` in its matrix; missing entries deny.
    pub fn can(&self, resource: &str, action: &str) -> bool {
        self.role.has_permission(resource, action)
    }
}

/// Admit the actor iff its role name is one of `allowed`.
pub fn authorize_role(actor: &Actor, allowed: &[&str]) -> FolioResult<()> {
    if allowed.contains(&actor.role.name.as_str()) {
        return Ok(());
    }
    debug!(user_id = %actor.user.id, role = %actor.role.name, "Role not in allowed set");
    Err(FolioError::forbidden(format!(
        "role {} is not authorized for this operation",
        actor.role.name
    )))
}

/// Admit the actor iff [`Actor::can`] holds for `resource`/`action`.
pub fn authorize_permission(actor: &Actor, resource: &str, action: &str) -> FolioResult<()> {
    if actor.can(resource, action) {
        return Ok(());
    }
    debug!(
        user_id = %actor.user.id,
        role = %actor.role.name,
        resource,
        action,
        "Permission denied"
    );
    Err(FolioError::forbidden(format!(
        "you do not have permission to {action} {resource}"
    )))
}
