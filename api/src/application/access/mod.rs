use uuid::Uuid;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::user::{Role, Viewer};

/// Authenticated caller as decoded from the bearer token.
// Presentation builds this from the request; this module does not depend on
// HTTP types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
    pub name: String,
    pub email: String,
}

impl AuthUser {
    pub fn is_staff(&self) -> bool {
        matches!(self.role, Role::Teacher | Role::Admin)
    }
}

pub fn require_role(user: &AuthUser, allowed: &[Role]) -> ServiceResult<()> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden)
    }
}

pub const STAFF: &[Role] = &[Role::Teacher, Role::Admin];
pub const ADMIN: &[Role] = &[Role::Admin];
pub const STUDENT: &[Role] = &[Role::Student];

/// Visibility context of the caller. The class comes from the stored
/// profile, not the token, so a class change applies without a new login.
pub async fn resolve_viewer<R>(users: &R, user: &AuthUser) -> ServiceResult<Viewer>
where
    R: UserRepository + ?Sized,
{
    match users.find_by_id(user.id).await? {
        Some(u) if u.is_active => Ok(u.viewer()),
        Some(_) => Err(ServiceError::Forbidden),
        None => Err(ServiceError::NotFound("User")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            role,
            name: "x".into(),
            email: "x@dps.in".into(),
        }
    }

    #[test]
    fn role_gate() {
        assert!(require_role(&user(Role::Teacher), STAFF).is_ok());
        assert!(matches!(
            require_role(&user(Role::Student), STAFF),
            Err(ServiceError::Forbidden)
        ));
        assert!(require_role(&user(Role::Admin), ADMIN).is_ok());
        assert!(user(Role::Admin).is_staff());
        assert!(!user(Role::Student).is_staff());
    }
}
