use chrono::Utc;
use uuid::Uuid;

use crate::application::access::AuthUser;
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::quiz_repository::QuizRepository;
use crate::domain::quizzes::quiz::{Quiz, QuizPatch, QuizView};
use crate::domain::users::user::Role;

/// Teachers manage their own quizzes; admins manage all of them.
pub(crate) fn ensure_manager(quiz: &Quiz, user: &AuthUser) -> ServiceResult<()> {
    match user.role {
        Role::Admin => Ok(()),
        Role::Teacher if quiz.teacher_id == user.id || quiz.created_by == user.id => Ok(()),
        _ => Err(ServiceError::Forbidden),
    }
}

pub(crate) async fn load_live<R: QuizRepository + ?Sized>(repo: &R, id: Uuid) -> ServiceResult<Quiz> {
    match repo.find(id).await? {
        Some(q) if !q.is_deleted => Ok(q),
        _ => Err(ServiceError::NotFound("Quiz")),
    }
}

pub struct UpdateQuiz<'a, R: QuizRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: QuizRepository + ?Sized> UpdateQuiz<'a, R> {
    pub async fn execute(&self, user: &AuthUser, id: Uuid, patch: QuizPatch) -> ServiceResult<QuizView> {
        let mut quiz = load_live(self.repo, id).await?;
        ensure_manager(&quiz, user)?;
        let now = Utc::now();
        quiz.apply(patch, user.id, now)?;
        self.repo.update(&quiz).await?;
        tracing::info!(quiz_id = %quiz.id, version = quiz.version, "quiz_updated");
        Ok(quiz.view(now))
    }
}

pub struct DeleteQuiz<'a, R: QuizRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: QuizRepository + ?Sized> DeleteQuiz<'a, R> {
    /// Soft delete: the row stays for submission history.
    pub async fn execute(&self, user: &AuthUser, id: Uuid) -> ServiceResult<()> {
        let mut quiz = load_live(self.repo, id).await?;
        ensure_manager(&quiz, user)?;
        quiz.is_deleted = true;
        quiz.is_active = false;
        quiz.updated_by = Some(user.id);
        quiz.updated_at = Utc::now();
        self.repo.update(&quiz).await?;
        tracing::info!(quiz_id = %quiz.id, actor = %user.id, "quiz_deleted");
        Ok(())
    }
}
