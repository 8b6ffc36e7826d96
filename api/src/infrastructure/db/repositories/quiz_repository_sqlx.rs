use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::quiz_repository::{QuizAuthor, QuizRepository};
use crate::domain::quizzes::quiz::{
    NewSubmission, Quiz, QuizSpec, QuizSubmission, ShowResults, attempt_allowed,
};
use crate::infrastructure::db::PgPool;

const QUIZ_SELECT: &str = r#"SELECT q.id, q.title, q.description, q.subject, q.class, q.section,
        q.teacher_id, u.name AS teacher_name, q.questions, q.duration, q.passing_score,
        q.max_attempts, q.is_active, q.is_published, q.show_results, q.start_date, q.end_date,
        q.time_limit, q.created_by, q.updated_by, q.is_deleted, q.total_submissions,
        q.average_score, q.version, q.created_at, q.updated_at
   FROM quizzes q
   LEFT JOIN users u ON u.id = q.teacher_id"#;

const SUBMISSION_SELECT: &str = r#"SELECT s.id, s.quiz_id, s.student_id, u.name AS student_name,
        u.email AS student_email, s.answers, s.score, s.total_points, s.total_questions,
        s.percentage, s.passed, s.time_taken, s.submitted_at
   FROM quiz_submissions s
   LEFT JOIN users u ON u.id = s.student_id"#;

pub struct SqlxQuizRepository {
    pub pool: PgPool,
}

impl SqlxQuizRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_where(&self, filter: &str, bind: Option<BindValue<'_>>) -> anyhow::Result<Vec<Quiz>> {
        let sql = format!("{QUIZ_SELECT} WHERE NOT q.is_deleted {filter} ORDER BY q.created_at DESC");
        let query = sqlx::query(&sql);
        let query = match bind {
            Some(BindValue::Text(v)) => query.bind(v),
            Some(BindValue::Id(v)) => query.bind(v),
            None => query,
        };
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(map_quiz).collect()
    }
}

enum BindValue<'a> {
    Text(&'a str),
    Id(Uuid),
}

fn map_quiz(r: &PgRow) -> anyhow::Result<Quiz> {
    let show_results: String = r.get("show_results");
    Ok(Quiz {
        id: r.get("id"),
        title: r.get("title"),
        description: r.try_get("description").ok(),
        subject: r.get("subject"),
        class: r.get("class"),
        section: r.try_get("section").ok(),
        teacher_id: r.get("teacher_id"),
        teacher_name: r.try_get("teacher_name").ok(),
        questions: serde_json::from_value(r.get::<JsonValue, _>("questions"))?,
        duration: r.get("duration"),
        passing_score: r.get("passing_score"),
        max_attempts: r.get("max_attempts"),
        is_active: r.get("is_active"),
        is_published: r.get("is_published"),
        show_results: ShowResults::parse(&show_results).unwrap_or_default(),
        start_date: r.get("start_date"),
        end_date: r.get("end_date"),
        time_limit: r.get("time_limit"),
        created_by: r.get("created_by"),
        updated_by: r.try_get("updated_by").ok(),
        is_deleted: r.get("is_deleted"),
        total_submissions: r.get("total_submissions"),
        average_score: r.get("average_score"),
        version: r.get("version"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}

fn map_submission(r: &PgRow) -> anyhow::Result<QuizSubmission> {
    Ok(QuizSubmission {
        id: r.get("id"),
        quiz_id: r.get("quiz_id"),
        student_id: r.get("student_id"),
        student_name: r.try_get("student_name").ok(),
        student_email: r.try_get("student_email").ok(),
        answers: serde_json::from_value(r.get::<JsonValue, _>("answers"))?,
        score: r.get("score"),
        total_points: r.get("total_points"),
        total_questions: r.get("total_questions"),
        percentage: r.get("percentage"),
        passed: r.get("passed"),
        time_taken: r.try_get("time_taken").ok(),
        submitted_at: r.get("submitted_at"),
    })
}

#[async_trait]
impl QuizRepository for SqlxQuizRepository {
    async fn create(&self, spec: &QuizSpec, author: QuizAuthor<'_>) -> anyhow::Result<Quiz> {
        let id: Uuid = sqlx::query_scalar(
            r#"INSERT INTO quizzes (title, description, subject, class, section, teacher_id,
                                    questions, duration, passing_score, max_attempts, is_active,
                                    is_published, show_results, start_date, end_date, time_limit,
                                    created_by)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $6)
               RETURNING id"#,
        )
        .bind(&spec.title)
        .bind(&spec.description)
        .bind(&spec.subject)
        .bind(&spec.class)
        .bind(&spec.section)
        .bind(author.id)
        .bind(serde_json::to_value(&spec.questions)?)
        .bind(spec.duration)
        .bind(spec.passing_score)
        .bind(spec.max_attempts)
        .bind(spec.is_active)
        .bind(spec.is_published)
        .bind(spec.show_results.as_str())
        .bind(spec.start_date)
        .bind(spec.end_date)
        .bind(spec.time_limit)
        .fetch_one(&self.pool)
        .await?;
        self.find(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("quiz {id} missing after insert"))
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Quiz>> {
        self.fetch_where("", None).await
    }

    async fn list_for_class(&self, class: &str) -> anyhow::Result<Vec<Quiz>> {
        self.fetch_where("AND q.class = $1", Some(BindValue::Text(class)))
            .await
    }

    async fn list_by_teacher(&self, teacher_id: Uuid) -> anyhow::Result<Vec<Quiz>> {
        self.fetch_where("AND q.teacher_id = $1", Some(BindValue::Id(teacher_id)))
            .await
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Quiz>> {
        let row = sqlx::query(&format!("{QUIZ_SELECT} WHERE q.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_quiz).transpose()
    }

    async fn update(&self, q: &Quiz) -> anyhow::Result<()> {
        sqlx::query(
            r#"UPDATE quizzes
               SET title = $2, description = $3, subject = $4, class = $5, section = $6,
                   questions = $7, duration = $8, passing_score = $9, max_attempts = $10,
                   is_active = $11, is_published = $12, show_results = $13, start_date = $14,
                   end_date = $15, time_limit = $16, updated_by = $17, is_deleted = $18,
                   version = $19, updated_at = $20
               WHERE id = $1"#,
        )
        .bind(q.id)
        .bind(&q.title)
        .bind(&q.description)
        .bind(&q.subject)
        .bind(&q.class)
        .bind(&q.section)
        .bind(serde_json::to_value(&q.questions)?)
        .bind(q.duration)
        .bind(q.passing_score)
        .bind(q.max_attempts)
        .bind(q.is_active)
        .bind(q.is_published)
        .bind(q.show_results.as_str())
        .bind(q.start_date)
        .bind(q.end_date)
        .bind(q.time_limit)
        .bind(q.updated_by)
        .bind(q.is_deleted)
        .bind(q.version)
        .bind(q.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_submission(
        &self,
        s: &NewSubmission,
    ) -> anyhow::Result<Option<QuizSubmission>> {
        let score = i32::try_from(s.score.score).context("score exceeds INTEGER")?;
        let total_points =
            i32::try_from(s.score.total_possible).context("total points exceed INTEGER")?;
        let percentage = i32::try_from(s.score.percentage).context("percentage exceeds INTEGER")?;

        let mut tx = self.pool.begin().await?;
        // Row lock serialises concurrent attempts by the same student.
        let max_attempts: Option<i32> =
            sqlx::query_scalar("SELECT max_attempts FROM quizzes WHERE id = $1 FOR UPDATE")
                .bind(s.quiz_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(max_attempts) = max_attempts else {
            anyhow::bail!("quiz {} missing", s.quiz_id);
        };
        let attempts: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM quiz_submissions WHERE quiz_id = $1 AND student_id = $2",
        )
        .bind(s.quiz_id)
        .bind(s.student_id)
        .fetch_one(&mut *tx)
        .await?;
        if !attempt_allowed(max_attempts, attempts) {
            tx.rollback().await?;
            return Ok(None);
        }
        let id: Uuid = sqlx::query_scalar(
            r#"INSERT INTO quiz_submissions (quiz_id, student_id, answers, score, total_points,
                                             total_questions, percentage, passed, time_taken,
                                             submitted_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING id"#,
        )
        .bind(s.quiz_id)
        .bind(s.student_id)
        .bind(serde_json::to_value(&s.answers)?)
        .bind(score)
        .bind(total_points)
        .bind(s.total_questions)
        .bind(percentage)
        .bind(s.score.passed)
        .bind(s.time_taken)
        .bind(s.submitted_at)
        .fetch_one(&mut *tx)
        .await?;
        sqlx::query(
            r#"UPDATE quizzes q
               SET total_submissions = stats.total, average_score = stats.average
               FROM (SELECT COUNT(*) AS total, COALESCE(AVG(percentage), 0)::float8 AS average
                       FROM quiz_submissions WHERE quiz_id = $1) AS stats
               WHERE q.id = $1"#,
        )
        .bind(s.quiz_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        let stored = self
            .find_submission(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("submission {id} missing after insert"))?;
        Ok(Some(stored))
    }

    async fn list_submissions(&self, quiz_id: Uuid) -> anyhow::Result<Vec<QuizSubmission>> {
        let rows = sqlx::query(&format!(
            "{SUBMISSION_SELECT} WHERE s.quiz_id = $1 ORDER BY s.submitted_at DESC"
        ))
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_submission).collect()
    }

    async fn find_submission(&self, id: Uuid) -> anyhow::Result<Option<QuizSubmission>> {
        let row = sqlx::query(&format!("{SUBMISSION_SELECT} WHERE s.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_submission).transpose()
    }
}
