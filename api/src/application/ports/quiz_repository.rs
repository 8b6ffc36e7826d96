use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::quizzes::quiz::{NewSubmission, Quiz, QuizSpec, QuizSubmission};

#[derive(Debug, Clone, Copy)]
pub struct QuizAuthor<'a> {
    pub id: Uuid,
    pub name: &'a str,
}

#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn create(&self, spec: &QuizSpec, author: QuizAuthor<'_>) -> anyhow::Result<Quiz>;
    /// Non-deleted quizzes, newest first.
    async fn list_all(&self) -> anyhow::Result<Vec<Quiz>>;
    async fn list_for_class(&self, class: &str) -> anyhow::Result<Vec<Quiz>>;
    async fn list_by_teacher(&self, teacher_id: Uuid) -> anyhow::Result<Vec<Quiz>>;
    /// Includes soft-deleted rows so the change relay can report them.
    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Quiz>>;
    async fn update(&self, quiz: &Quiz) -> anyhow::Result<()>;
    /// Stores the submission and refreshes the quiz statistics in one
    /// transaction. Returns `None` without storing anything when the
    /// student has already used every allowed attempt; the check runs under
    /// the same lock as the insert.
    async fn record_submission(
        &self,
        submission: &NewSubmission,
    ) -> anyhow::Result<Option<QuizSubmission>>;
    async fn list_submissions(&self, quiz_id: Uuid) -> anyhow::Result<Vec<QuizSubmission>>;
    async fn find_submission(&self, id: Uuid) -> anyhow::Result<Option<QuizSubmission>>;
}
