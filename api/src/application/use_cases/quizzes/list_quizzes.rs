use chrono::Utc;
use uuid::Uuid;

use crate::application::access::{AuthUser, resolve_viewer};
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::quiz_repository::QuizRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::domain::quizzes::quiz::QuizView;
use crate::domain::users::user::Role;

pub struct ListQuizzes<'a, R: QuizRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: QuizRepository + ?Sized> ListQuizzes<'a, R> {
    pub async fn execute(&self) -> anyhow::Result<Vec<QuizView>> {
        let now = Utc::now();
        Ok(self.repo.list_all().await?.iter().map(|q| q.view(now)).collect())
    }
}

/// Quizzes of one class. Students only reach their own class and only see
/// quizzes they could take right now, with answers hidden.
pub struct ListClassQuizzes<'a, R, U>
where
    R: QuizRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    pub repo: &'a R,
    pub users: &'a U,
}

impl<'a, R, U> ListClassQuizzes<'a, R, U>
where
    R: QuizRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    pub async fn execute(&self, user: &AuthUser, class: &str) -> ServiceResult<Vec<QuizView>> {
        let now = Utc::now();
        let quizzes = self.repo.list_for_class(class).await?;
        if user.is_staff() {
            return Ok(quizzes.iter().map(|q| q.view(now)).collect());
        }
        let viewer = resolve_viewer(self.users, user).await?;
        if viewer.class.as_deref() != Some(class) {
            return Err(ServiceError::Forbidden);
        }
        Ok(quizzes
            .iter()
            .filter(|q| q.availability(now).is_ok())
            .map(|q| q.student_view(now))
            .collect())
    }
}

pub struct GetQuiz<'a, R, U>
where
    R: QuizRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    pub repo: &'a R,
    pub users: &'a U,
}

impl<'a, R, U> GetQuiz<'a, R, U>
where
    R: QuizRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    pub async fn execute(&self, user: &AuthUser, id: Uuid) -> ServiceResult<QuizView> {
        let now = Utc::now();
        let quiz = match self.repo.find(id).await? {
            Some(q) if !q.is_deleted => q,
            _ => return Err(ServiceError::NotFound("Quiz")),
        };
        if user.role != Role::Student {
            return Ok(quiz.view(now));
        }
        let viewer = resolve_viewer(self.users, user).await?;
        if viewer.class.as_deref() != Some(quiz.class.as_str()) || !quiz.is_published {
            return Err(ServiceError::NotFound("Quiz"));
        }
        Ok(quiz.student_view(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{InMemoryQuizzes, InMemoryUsers};
    use crate::domain::quizzes::quiz::tests::sample_quiz;

    fn student(users: &InMemoryUsers, class: &str) -> AuthUser {
        let u = users.seed("Ravi", Role::Student, Some(class));
        AuthUser {
            id: u.id,
            role: Role::Student,
            name: u.name,
            email: u.email,
        }
    }

    #[tokio::test]
    async fn students_see_only_available_quizzes_of_their_class_without_answers() {
        let repo = InMemoryQuizzes::default();
        let users = InMemoryUsers::default();
        let now = Utc::now();
        let open = sample_quiz(now);
        let mut draft = sample_quiz(now);
        draft.is_published = false;
        repo.insert(open.clone());
        repo.insert(draft);

        let s = student(&users, "6A");
        let uc = ListClassQuizzes {
            repo: &repo,
            users: &users,
        };
        let views = uc.execute(&s, "6A").await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].quiz.id, open.id);
        assert!(views[0].quiz.questions.iter().all(|q| q.correct_answer.is_none()));

        assert!(matches!(
            uc.execute(&s, "6B").await,
            Err(ServiceError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn deleted_quiz_is_not_found() {
        let repo = InMemoryQuizzes::default();
        let users = InMemoryUsers::default();
        let mut quiz = sample_quiz(Utc::now());
        quiz.is_deleted = true;
        repo.insert(quiz.clone());
        let admin = AuthUser {
            id: Uuid::new_v4(),
            role: Role::Admin,
            name: "A".into(),
            email: "a@dps.in".into(),
        };
        let err = GetQuiz {
            repo: &repo,
            users: &users,
        }
        .execute(&admin, quiz.id)
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("Quiz")));
    }
}
