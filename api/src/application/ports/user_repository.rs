use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::users::user::{Role, User, ValidNewUser};

#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts the user and assigns the next member code of its role.
    /// Returns `None` when the email is already registered.
    async fn create_user(
        &self,
        user: &ValidNewUser,
        password_hash: &str,
    ) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserCredentials>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn email_taken(&self, email: &str) -> anyhow::Result<bool>;
    async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> anyhow::Result<()>;
    async fn list_by_role(&self, role: Role) -> anyhow::Result<Vec<User>>;
    async fn list_students_in(&self, classes: &[String]) -> anyhow::Result<Vec<User>>;
}
