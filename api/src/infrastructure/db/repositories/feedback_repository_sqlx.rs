use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::feedback_repository::FeedbackRepository;
use crate::domain::feedback::feedback::{Feedback, FeedbackWithStudent, NewFeedback};
use crate::infrastructure::db::PgPool;

pub struct SqlxFeedbackRepository {
    pub pool: PgPool,
}

impl SqlxFeedbackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_feedback(r: &PgRow) -> Feedback {
    Feedback {
        id: r.get("id"),
        student_id: r.get("student_id"),
        title: r.get("title"),
        message: r.get("message"),
        rating: r.try_get("rating").ok(),
        created_at: r.get("created_at"),
    }
}

#[async_trait]
impl FeedbackRepository for SqlxFeedbackRepository {
    async fn create(&self, student_id: Uuid, f: &NewFeedback) -> anyhow::Result<Feedback> {
        let row = sqlx::query(
            r#"INSERT INTO feedback (student_id, title, message, rating)
               VALUES ($1, $2, $3, $4)
               RETURNING id, student_id, title, message, rating, created_at"#,
        )
        .bind(student_id)
        .bind(&f.title)
        .bind(&f.message)
        .bind(f.rating)
        .fetch_one(&self.pool)
        .await?;
        Ok(map_feedback(&row))
    }

    async fn list_with_students(&self) -> anyhow::Result<Vec<FeedbackWithStudent>> {
        let rows = sqlx::query(
            r#"SELECT f.id, f.student_id, f.title, f.message, f.rating, f.created_at,
                      u.name AS student_name, u.email AS student_email
               FROM feedback f
               LEFT JOIN users u ON u.id = f.student_id
               ORDER BY f.created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|r| FeedbackWithStudent {
                feedback: map_feedback(r),
                student_name: r.try_get("student_name").ok(),
                student_email: r.try_get("student_email").ok(),
            })
            .collect())
    }

    async fn list_for_student(&self, student_id: Uuid) -> anyhow::Result<Vec<Feedback>> {
        let rows = sqlx::query(
            r#"SELECT id, student_id, title, message, rating, created_at
               FROM feedback WHERE student_id = $1
               ORDER BY created_at DESC"#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(map_feedback).collect())
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Feedback>> {
        let row = sqlx::query(
            "SELECT id, student_id, title, message, rating, created_at FROM feedback WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(map_feedback))
    }
}
