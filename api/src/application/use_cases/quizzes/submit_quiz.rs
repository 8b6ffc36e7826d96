use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::access::{AuthUser, resolve_viewer};
use crate::application::error::ServiceError;
use crate::application::ports::quiz_repository::QuizRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::domain::quizzes::quiz::{
    Answer, NewSubmission, Quiz, QuizScore, ShowResults, Unavailable,
};

#[derive(thiserror::Error, Debug)]
pub enum SubmitQuizError {
    #[error("Quiz not found")]
    NotFound,
    #[error("Quiz is not assigned to your class")]
    WrongClass,
    #[error(transparent)]
    Unavailable(#[from] Unavailable),
    #[error("Quiz already submitted")]
    AttemptsExhausted,
    #[error("failed to record submission")]
    Persist(#[source] anyhow::Error),
}

impl From<SubmitQuizError> for ServiceError {
    fn from(err: SubmitQuizError) -> Self {
        match err {
            SubmitQuizError::NotFound => ServiceError::NotFound("Quiz"),
            SubmitQuizError::WrongClass => ServiceError::Forbidden,
            SubmitQuizError::Unavailable(e) => ServiceError::BadRequest(e.to_string()),
            SubmitQuizError::AttemptsExhausted => {
                ServiceError::Conflict(SubmitQuizError::AttemptsExhausted.to_string())
            }
            SubmitQuizError::Persist(e) => ServiceError::Internal(e),
        }
    }
}

impl From<ServiceError> for SubmitQuizError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(_) => SubmitQuizError::NotFound,
            ServiceError::Forbidden => SubmitQuizError::WrongClass,
            other => SubmitQuizError::Persist(anyhow::anyhow!(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubmitQuizRequest {
    pub answers: Vec<Option<Answer>>,
    #[serde(default)]
    pub time_taken: Option<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmissionReceipt {
    pub submission_id: Uuid,
    pub submitted_at: DateTime<Utc>,
    /// Present only when the quiz reveals results on submission.
    pub result: Option<QuizScore>,
}

fn reveal_now(quiz: &Quiz, now: DateTime<Utc>) -> bool {
    match quiz.show_results {
        ShowResults::AfterSubmission => true,
        ShowResults::AfterDeadline => quiz.has_ended(now),
        ShowResults::Never => false,
    }
}

pub struct SubmitQuiz<'a, R, U>
where
    R: QuizRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    pub repo: &'a R,
    pub users: &'a U,
}

impl<'a, R, U> SubmitQuiz<'a, R, U>
where
    R: QuizRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    pub async fn execute(
        &self,
        student: &AuthUser,
        quiz_id: Uuid,
        req: SubmitQuizRequest,
    ) -> Result<SubmissionReceipt, SubmitQuizError> {
        let now = Utc::now();
        let quiz = match self.repo.find(quiz_id).await.map_err(SubmitQuizError::Persist)? {
            Some(q) if !q.is_deleted => q,
            _ => return Err(SubmitQuizError::NotFound),
        };
        let viewer = resolve_viewer(self.users, student).await?;
        if viewer.class.as_deref() != Some(quiz.class.as_str()) {
            return Err(SubmitQuizError::WrongClass);
        }
        quiz.availability(now)?;

        let score = quiz.score(&req.answers);
        let stored = self
            .repo
            .record_submission(&NewSubmission {
                quiz_id: quiz.id,
                student_id: student.id,
                answers: req.answers,
                score: score.clone(),
                total_questions: quiz.questions.len() as i32,
                time_taken: req.time_taken,
                submitted_at: now,
            })
            .await
            .map_err(SubmitQuizError::Persist)?
            .ok_or(SubmitQuizError::AttemptsExhausted)?;
        tracing::info!(
            quiz_id = %quiz.id,
            student_id = %student.id,
            score = score.score,
            percentage = score.percentage,
            "quiz_submitted"
        );
        Ok(SubmissionReceipt {
            submission_id: stored.id,
            submitted_at: stored.submitted_at,
            result: reveal_now(&quiz, now).then_some(score),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{InMemoryQuizzes, InMemoryUsers};
    use crate::domain::quizzes::quiz::tests::sample_quiz;
    use crate::domain::users::user::Role;
    use chrono::Duration;

    fn student(users: &InMemoryUsers, class: &str) -> AuthUser {
        let u = users.seed("Ravi Kumar", Role::Student, Some(class));
        AuthUser {
            id: u.id,
            role: Role::Student,
            name: u.name,
            email: u.email,
        }
    }

    fn answers(a: &[u32]) -> SubmitQuizRequest {
        SubmitQuizRequest {
            answers: a.iter().map(|i| Some(Answer::Single(*i))).collect(),
            time_taken: Some(4),
        }
    }

    #[tokio::test]
    async fn scores_and_updates_statistics() {
        let repo = InMemoryQuizzes::default();
        let users = InMemoryUsers::default();
        let quiz = sample_quiz(Utc::now());
        repo.insert(quiz.clone());
        let s = student(&users, "6A");

        let receipt = SubmitQuiz {
            repo: &repo,
            users: &users,
        }
        .execute(&s, quiz.id, answers(&[0, 1]))
        .await
        .unwrap();
        let result = receipt.result.unwrap();
        assert_eq!(result.score, 1);
        assert_eq!(result.total_possible, 3);
        assert_eq!(result.percentage, 33);
        assert!(!result.passed);

        let stored = repo.get(quiz.id).unwrap();
        assert_eq!(stored.total_submissions, 1);
        assert_eq!(stored.average_score, 33.0);
    }

    #[tokio::test]
    async fn second_attempt_conflicts_when_capped_at_one() {
        let repo = InMemoryQuizzes::default();
        let users = InMemoryUsers::default();
        let quiz = sample_quiz(Utc::now());
        repo.insert(quiz.clone());
        let s = student(&users, "6A");
        let uc = SubmitQuiz {
            repo: &repo,
            users: &users,
        };
        uc.execute(&s, quiz.id, answers(&[0, 0])).await.unwrap();
        let err = uc.execute(&s, quiz.id, answers(&[0, 0])).await.unwrap_err();
        assert!(matches!(err, SubmitQuizError::AttemptsExhausted));
        assert!(matches!(ServiceError::from(err), ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn simultaneous_attempts_store_only_one() {
        let repo = InMemoryQuizzes::default();
        let users = InMemoryUsers::default();
        let quiz = sample_quiz(Utc::now());
        repo.insert(quiz.clone());
        let s = student(&users, "6A");
        let uc = SubmitQuiz {
            repo: &repo,
            users: &users,
        };
        let (a, b) = tokio::join!(
            uc.execute(&s, quiz.id, answers(&[0, 0])),
            uc.execute(&s, quiz.id, answers(&[1, 1]))
        );
        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        let err = a.err().or(b.err()).unwrap();
        assert!(matches!(err, SubmitQuizError::AttemptsExhausted));
        assert_eq!(repo.list_submissions(quiz.id).await.unwrap().len(), 1);
        assert_eq!(repo.get(quiz.id).unwrap().total_submissions, 1);
    }

    #[tokio::test]
    async fn closed_or_foreign_quizzes_are_refused() {
        let repo = InMemoryQuizzes::default();
        let users = InMemoryUsers::default();
        let now = Utc::now();
        let mut ended = sample_quiz(now);
        ended.start_date = now - Duration::days(3);
        ended.end_date = now - Duration::days(1);
        repo.insert(ended.clone());
        let uc = SubmitQuiz {
            repo: &repo,
            users: &users,
        };

        let s = student(&users, "6A");
        let err = uc.execute(&s, ended.id, answers(&[0])).await.unwrap_err();
        assert!(matches!(err, SubmitQuizError::Unavailable(Unavailable::Ended)));

        let other = student(&users, "7C");
        let err = uc.execute(&other, ended.id, answers(&[0])).await.unwrap_err();
        assert!(matches!(err, SubmitQuizError::WrongClass));
    }

    #[tokio::test]
    async fn hidden_results_are_still_recorded() {
        let repo = InMemoryQuizzes::default();
        let users = InMemoryUsers::default();
        let mut quiz = sample_quiz(Utc::now());
        quiz.show_results = ShowResults::Never;
        repo.insert(quiz.clone());
        let s = student(&users, "6A");
        let receipt = SubmitQuiz {
            repo: &repo,
            users: &users,
        }
        .execute(&s, quiz.id, answers(&[0, 0]))
        .await
        .unwrap();
        assert!(receipt.result.is_none());
        assert_eq!(repo.list_submissions(quiz.id).await.unwrap()[0].score, 3);
    }
}
