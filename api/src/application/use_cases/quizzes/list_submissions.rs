use uuid::Uuid;

use crate::application::access::AuthUser;
use crate::application::error::ServiceResult;
use crate::application::ports::quiz_repository::QuizRepository;
use crate::application::use_cases::quizzes::update_quiz::{ensure_manager, load_live};
use crate::domain::quizzes::quiz::QuizSubmission;

pub struct ListSubmissions<'a, R: QuizRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: QuizRepository + ?Sized> ListSubmissions<'a, R> {
    pub async fn execute(&self, user: &AuthUser, quiz_id: Uuid) -> ServiceResult<Vec<QuizSubmission>> {
        let quiz = load_live(self.repo, quiz_id).await?;
        ensure_manager(&quiz, user)?;
        Ok(self.repo.list_submissions(quiz.id).await?)
    }
}
