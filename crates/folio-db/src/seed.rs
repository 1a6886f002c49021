//! Initial data: the default role set and the bootstrap administrator.
//!
//! Both seeders are idempotent and safe to run on every start.

use folio_core::error::{FolioError, FolioResult};
use folio_core::models::role::{CreateRole, PermissionMatrix, Role, SUPER_ROLE};
use folio_core::models::user::{CreateUser, User};
use folio_core::repository::{RoleRepository, UserRepository};
use tracing::info;

type Grants = &'static [(&'static str, bool)];

struct DefaultRole {
    name: &'static str,
    description: &'static str,
    articles: Grants,
    categories: Grants,
    users: Grants,
    roles: Grants,
    media: Grants,
}

impl DefaultRole {
    fn matrix(&self) -> PermissionMatrix {
        PermissionMatrix::from_rows([
            ("articles", self.articles),
            ("categories", self.categories),
            ("users", self.users),
            ("roles", self.roles),
            ("media", self.media),
        ])
    }
}

const CRUD_ALL: Grants = &[
    ("create", true),
    ("read", true),
    ("update", true),
    ("delete", true),
];
const READ_ONLY: Grants = &[
    ("create", false),
    ("read", true),
    ("update", false),
    ("delete", false),
];
const NO_ACCESS: Grants = &[
    ("create", false),
    ("read", false),
    ("update", false),
    ("delete", false),
];

static DEFAULT_ROLES: &[DefaultRole] = &[
    DefaultRole {
        name: SUPER_ROLE,
        description: "Administrator with full access",
        articles: &[
            ("create", true),
            ("read", true),
            ("update", true),
            ("delete", true),
            ("publish", true),
        ],
        categories: CRUD_ALL,
        users: CRUD_ALL,
        roles: CRUD_ALL,
        media: &[("upload", true), ("manage", true)],
    },
    DefaultRole {
        name: "editor",
        description: "Editor with content management privileges",
        articles: &[
            ("create", true),
            ("read", true),
            ("update", true),
            ("delete", true),
            ("publish", true),
        ],
        categories: &[
            ("create", true),
            ("read", true),
            ("update", true),
            ("delete", false),
        ],
        users: READ_ONLY,
        roles: READ_ONLY,
        media: &[("upload", true), ("manage", true)],
    },
    DefaultRole {
        name: "writer",
        description: "Writer with content creation privileges",
        articles: &[
            ("create", true),
            ("read", true),
            ("update", true),
            ("delete", false),
            ("publish", false),
        ],
        categories: READ_ONLY,
        users: NO_ACCESS,
        roles: NO_ACCESS,
        media: &[("upload", true), ("manage", false)],
    },
    DefaultRole {
        name: "subscriber",
        description: "Subscriber with read-only access",
        articles: &[
            ("create", false),
            ("read", true),
            ("update", false),
            ("delete", false),
            ("publish", false),
        ],
        categories: READ_ONLY,
        users: NO_ACCESS,
        roles: NO_ACCESS,
        media: &[("upload", false), ("manage", false)],
    },
];

/// Names of the roles created by [`seed_default_roles`], in seeding order.
pub fn default_role_names() -> impl Iterator<Item = &'static str> {
    DEFAULT_ROLES.iter().map(|role| role.name)
}

/// Create every default role that does not exist yet. Existing roles
/// are left untouched so admin edits survive restarts.
pub async fn seed_default_roles<R: RoleRepository>(roles: &R) -> FolioResult<Vec<Role>> {
    let mut seeded = Vec::with_capacity(DEFAULT_ROLES.len());

    for default in DEFAULT_ROLES {
        let role = match roles.get_by_name(default.name).await {
            Ok(existing) => existing,
            Err(FolioError::NotFound { .. }) => {
                info!(role = default.name, "Seeding default role");
                roles
                    .create(CreateRole {
                        name: default.name.into(),
                        description: default.description.into(),
                        permissions: default.matrix(),
                    })
                    .await?
            }
            Err(e) => return Err(e),
        };
        seeded.push(role);
    }

    Ok(seeded)
}

/// Credentials of the first administrator account.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Create the bootstrap administrator unless a user with that email
/// already exists. Requires the super role to be seeded.
pub async fn seed_admin_user<R, U>(
    roles: &R,
    users: &U,
    admin: BootstrapAdmin,
) -> FolioResult<User>
where
    R: RoleRepository,
    U: UserRepository,
{
    match users.get_by_email(&admin.email).await {
        Ok(existing) => return Ok(existing),
        Err(FolioError::NotFound { .. }) => {}
        Err(e) => return Err(e),
    }

    let super_role = roles.get_by_name(SUPER_ROLE).await?;
    let user = users
        .create(CreateUser {
            first_name: admin.first_name,
            last_name: admin.last_name,
            email: admin.email,
            password: admin.password,
            role_id: super_role.id,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, "Seeded bootstrap administrator");

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn super_role_is_seeded_first() {
        assert_eq!(default_role_names().next(), Some(SUPER_ROLE));
    }

    #[test]
    fn editor_may_publish_but_not_delete_categories() {
        let editor = DEFAULT_ROLES.iter().find(|r| r.name == "editor").unwrap();
        let matrix = editor.matrix();
        assert!(matrix.allows("articles", "publish"));
        assert!(!matrix.allows("categories", "delete"));
    }

    #[test]
    fn subscriber_is_read_only() {
        let subscriber = DEFAULT_ROLES
            .iter()
            .find(|r| r.name == "subscriber")
            .unwrap();
        let matrix = subscriber.matrix();
        assert!(matrix.allows("articles", "read"));
        for action in ["create", "update", "delete", "publish"] {
            assert!(!matrix.allows("articles", action), "articles.{action}");
        }
        assert!(!matrix.allows("media", "upload"));
    }
}
