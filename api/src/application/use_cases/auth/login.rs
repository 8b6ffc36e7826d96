use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use chrono::Utc;

use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::user::{User, normalize_email};

pub struct Login<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl<'a, R: UserRepository + ?Sized> Login<'a, R> {
    /// `None` for unknown email, wrong password or a deactivated account.
    pub async fn execute(&self, req: &LoginRequest) -> anyhow::Result<Option<User>> {
        let creds = match self.repo.find_by_email(&normalize_email(&req.email)).await? {
            Some(c) if c.user.is_active => c,
            _ => return Ok(None),
        };
        let parsed =
            PasswordHash::new(&creds.password_hash).map_err(|e| anyhow::anyhow!(e.to_string()))?;
        if Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed)
            .is_err()
        {
            return Ok(None);
        }
        let now = Utc::now();
        self.repo.touch_last_login(creds.user.id, now).await?;
        Ok(Some(User {
            last_login: Some(now),
            ..creds.user
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::InMemoryUsers;
    use crate::application::use_cases::auth::register::{Register, RegisterRequest};

    #[tokio::test]
    async fn verifies_password_and_records_login() {
        let repo = InMemoryUsers::default();
        let created = Register { repo: &repo }
            .execute(RegisterRequest {
                email: "meera@dps.in".into(),
                name: "Meera".into(),
                password: "hunter22".into(),
                role: "teacher".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let uc = Login { repo: &repo };

        let bad = uc
            .execute(&LoginRequest {
                email: "meera@dps.in".into(),
                password: "wrong".into(),
            })
            .await
            .unwrap();
        assert!(bad.is_none());

        let ok = uc
            .execute(&LoginRequest {
                email: " Meera@DPS.in".into(),
                password: "hunter22".into(),
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ok.id, created.id);
        assert!(repo.get(created.id).unwrap().last_login.is_some());
    }

    #[tokio::test]
    async fn unknown_email_is_none() {
        let repo = InMemoryUsers::default();
        let out = Login { repo: &repo }
            .execute(&LoginRequest {
                email: "ghost@dps.in".into(),
                password: "x".into(),
            })
            .await
            .unwrap();
        assert!(out.is_none());
    }
}
