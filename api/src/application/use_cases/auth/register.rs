use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString},
};
use password_hash::rand_core::OsRng;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::user::{NewUser, Role, User, normalize_email};
use crate::domain::validation::{self, ValidationError};

pub const MIN_PASSWORD: usize = 6;

pub struct Register<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone, Default)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: String,
    pub class: Option<String>,
    pub section: Option<String>,
    pub subjects: Vec<String>,
    pub classes: Vec<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl<'a, R: UserRepository + ?Sized> Register<'a, R> {
    pub async fn execute(&self, req: RegisterRequest) -> ServiceResult<User> {
        let role = match validation::optional(Some(req.role.as_str())) {
            Some(r) => Some(r.parse::<Role>()?),
            None => None,
        };
        let user = NewUser {
            name: req.name,
            email: req.email,
            role,
            class: req.class,
            section: req.section,
            subjects: req.subjects,
            classes: req.classes,
            phone: req.phone,
            address: req.address,
        }
        .validate()?;
        if req.password.is_empty() {
            return Err(ValidationError::Required { field: "password" }.into());
        }
        if req.password.chars().count() < MIN_PASSWORD {
            return Err(ValidationError::TooShort {
                field: "password",
                min: MIN_PASSWORD,
            }
            .into());
        }
        if self.repo.email_taken(&normalize_email(&user.email)).await? {
            return Err(ServiceError::conflict("Email already registered"));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!(e.to_string()))?
            .to_string();
        let created = self
            .repo
            .create_user(&user, &hash)
            .await?
            .ok_or_else(|| ServiceError::conflict("Email already registered"))?;
        tracing::info!(user_id = %created.id, role = %created.role, "user_registered");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::user_repository::UserCredentials;
    use crate::application::testing::InMemoryUsers;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    /// Answers `email_taken` with `false`, as a lookup that ran before a
    /// concurrent registration committed would.
    #[derive(Default)]
    struct StaleEmailLookup(InMemoryUsers);

    #[async_trait]
    impl UserRepository for StaleEmailLookup {
        async fn create_user(
            &self,
            user: &crate::domain::users::user::ValidNewUser,
            password_hash: &str,
        ) -> anyhow::Result<Option<User>> {
            self.0.create_user(user, password_hash).await
        }
        async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserCredentials>> {
            self.0.find_by_email(email).await
        }
        async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
            self.0.find_by_id(id).await
        }
        async fn email_taken(&self, _email: &str) -> anyhow::Result<bool> {
            Ok(false)
        }
        async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> anyhow::Result<()> {
            self.0.touch_last_login(id, at).await
        }
        async fn list_by_role(&self, role: Role) -> anyhow::Result<Vec<User>> {
            self.0.list_by_role(role).await
        }
        async fn list_students_in(&self, classes: &[String]) -> anyhow::Result<Vec<User>> {
            self.0.list_students_in(classes).await
        }
    }

    fn request(email: &str, role: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            name: "Asha".into(),
            password: "secret123".into(),
            role: role.into(),
            class: Some("6A".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn assigns_member_codes_per_role() {
        let repo = InMemoryUsers::default();
        let uc = Register { repo: &repo };
        let first = uc.execute(request("a@dps.in", "student")).await.unwrap();
        let second = uc.execute(request("b@dps.in", "student")).await.unwrap();
        let teacher = uc.execute(request("c@dps.in", "teacher")).await.unwrap();
        assert_eq!(first.member_code.as_deref(), Some("STU0001"));
        assert_eq!(second.member_code.as_deref(), Some("STU0002"));
        assert_eq!(teacher.member_code.as_deref(), Some("TCH0001"));
    }

    #[tokio::test]
    async fn rejects_duplicate_email_case_insensitively() {
        let repo = InMemoryUsers::default();
        let uc = Register { repo: &repo };
        uc.execute(request("a@dps.in", "student")).await.unwrap();
        let err = uc.execute(request("A@DPS.in", "teacher")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn insert_race_on_email_is_a_conflict() {
        let repo = StaleEmailLookup::default();
        let uc = Register { repo: &repo };
        uc.execute(request("a@dps.in", "student")).await.unwrap();
        let err = uc.execute(request("a@dps.in", "teacher")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(ref m) if m == "Email already registered"));
        assert_eq!(repo.list_by_role(Role::Student).await.unwrap().len(), 1);
        assert!(repo.list_by_role(Role::Teacher).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_unknown_role_and_missing_fields() {
        let repo = InMemoryUsers::default();
        let uc = Register { repo: &repo };
        let err = uc.execute(request("a@dps.in", "principal")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ValidationError::Invalid { field: "role", .. })));

        let err = uc.execute(request("a@dps.in", "")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ValidationError::Required { field: "role" })));

        let mut short = request("a@dps.in", "student");
        short.password = "abc".into();
        assert!(matches!(
            uc.execute(short).await.unwrap_err(),
            ServiceError::Validation(ValidationError::TooShort { .. })
        ));
    }
}
