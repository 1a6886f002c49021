//! Role administration with the super-role and in-use guards.

use folio_core::error::{FolioError, FolioResult};
use folio_core::models::role::{CreateRole, Role, UpdateRole};
use folio_core::repository::{RoleRepository, UserRepository};
use tracing::info;
use uuid::Uuid;

pub struct RoleService<R: RoleRepository, U: UserRepository> {
    role_repo: R,
    user_repo: U,
}

impl<R: RoleRepository, U: UserRepository> RoleService<R, U> {
    pub fn new(role_repo: R, user_repo: U) -> Self {
        Self {
            role_repo,
            user_repo,
        }
    }

    pub async fn get(&self, id: Uuid) -> FolioResult<Role> {
        self.role_repo.get_by_id(id).await
    }

    pub async fn list(&self) -> FolioResult<Vec<Role>> {
        self.role_repo.list().await
    }

    pub async fn create(&self, mut input: CreateRole) -> FolioResult<Role> {
        input.name = input.name.trim().to_string();
        if input.name.is_empty() {
            return Err(FolioError::validation("role name is required"));
        }
        self.ensure_name_free(&input.name, None).await?;

        let role = self.role_repo.create(input).await?;
        info!(role_id = %role.id, role = %role.name, "Role created");
        Ok(role)
    }

    /// Apply a partial update. Renaming the super role, or renaming any
    /// role onto an existing name, is a conflict.
    pub async fn update(&self, id: Uuid, mut input: UpdateRole) -> FolioResult<Role> {
        let current = self.role_repo.get_by_id(id).await?;

        if let Some(name) = input.name.as_mut() {
            *name = name.trim().to_string();
            if name.is_empty() {
                return Err(FolioError::validation("role name is required"));
            }
            if *name != current.name {
                if current.is_super() {
                    return Err(FolioError::conflict(format!(
                        "the {} role cannot be renamed",
                        current.name
                    )));
                }
                self.ensure_name_free(name, Some(id)).await?;
            }
        }

        let role = self.role_repo.update(id, input).await?;
        info!(role_id = %role.id, role = %role.name, "Role updated");
        Ok(role)
    }

    /// Delete a role nobody holds. The super role is never deletable.
    pub async fn delete(&self, id: Uuid) -> FolioResult<()> {
        let role = self.role_repo.get_by_id(id).await?;
        if role.is_super() {
            return Err(FolioError::conflict(format!(
                "the {} role cannot be deleted",
                role.name
            )));
        }

        let holders = self.user_repo.count_by_role(id).await?;
        if holders > 0 {
            return Err(FolioError::conflict(format!(
                "role {} is assigned to {holders} user(s)",
                role.name
            )));
        }

        self.role_repo.delete(id).await?;
        info!(role_id = %id, role = %role.name, "Role deleted");
        Ok(())
    }

    async fn ensure_name_free(&self, name: &str, except: Option<Uuid>) -> FolioResult<()> {
        match self.role_repo.get_by_name(name).await {
            Ok(existing) if Some(existing.id) != except => Err(FolioError::conflict(format!(
                "role {name} already exists"
            ))),
            Ok(_) | Err(FolioError::NotFound { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
