use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::user_repository::{UserCredentials, UserRepository};
use crate::domain::users::user::{Role, User, ValidNewUser, member_code};
use crate::infrastructure::db::PgPool;

const USER_COLUMNS: &str = "id, name, email, role, member_code, class, section, subjects, classes, \
     phone, address, is_active, last_login, created_at, updated_at";

pub struct SqlxUserRepository {
    pub pool: PgPool,
}

impl SqlxUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_user(r: &PgRow) -> anyhow::Result<User> {
    let role: String = r.get("role");
    Ok(User {
        id: r.get("id"),
        name: r.get("name"),
        email: r.get("email"),
        role: role.parse()?,
        member_code: r.try_get("member_code").ok(),
        class: r.try_get("class").ok(),
        section: r.try_get("section").ok(),
        subjects: r.get("subjects"),
        classes: r.get("classes"),
        phone: r.try_get("phone").ok(),
        address: r.try_get("address").ok(),
        is_active: r.get("is_active"),
        last_login: r.try_get("last_login").ok(),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}

const UNIQUE_VIOLATION: &str = "23505";
const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Unique violation on `users.email`, raised when a concurrent registration
/// wins the race after the `email_taken` check.
fn is_duplicate_email(e: &dyn sqlx::error::DatabaseError) -> bool {
    e.code().as_deref() == Some(UNIQUE_VIOLATION) && e.constraint() == Some(EMAIL_CONSTRAINT)
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create_user(
        &self,
        user: &ValidNewUser,
        password_hash: &str,
    ) -> anyhow::Result<Option<User>> {
        let mut tx = self.pool.begin().await?;
        let code = match user.role {
            Role::Student => Some("student_code_seq"),
            Role::Teacher => Some("teacher_code_seq"),
            Role::Admin => None,
        };
        let code = match code {
            Some(seq) => {
                let n: i64 = sqlx::query_scalar("SELECT nextval($1::regclass)")
                    .bind(seq)
                    .fetch_one(&mut *tx)
                    .await?;
                member_code(user.role, n)
            }
            None => None,
        };
        let row = sqlx::query(&format!(
            r#"INSERT INTO users (name, email, password_hash, role, member_code, class, section,
                                  subjects, classes, phone, address)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
               RETURNING {USER_COLUMNS}"#
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(password_hash)
        .bind(user.role.as_str())
        .bind(code)
        .bind(&user.class)
        .bind(&user.section)
        .bind(&user.subjects)
        .bind(&user.classes)
        .bind(&user.phone)
        .bind(&user.address)
        .fetch_one(&mut *tx)
        .await;
        let row = match row {
            Ok(row) => row,
            Err(sqlx::Error::Database(e)) if is_duplicate_email(e.as_ref()) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        tx.commit().await?;
        map_user(&row).map(Some)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserCredentials>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| {
            Ok(UserCredentials {
                user: map_user(&r)?,
                password_hash: r.get("password_hash"),
            })
        })
        .transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_user).transpose()
    }

    async fn email_taken(&self, email: &str) -> anyhow::Result<bool> {
        let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(taken)
    }

    async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_by_role(&self, role: Role) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY name"
        ))
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_user).collect()
    }

    async fn list_students_in(&self, classes: &[String]) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE role = 'student' AND class = ANY($1)
             ORDER BY class, name"
        ))
        .bind(classes)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_user).collect()
    }
}
