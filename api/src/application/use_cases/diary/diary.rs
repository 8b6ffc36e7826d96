use chrono::Utc;
use uuid::Uuid;

use crate::application::access::AuthUser;
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::diary_repository::DiaryRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::domain::diary::diary::{DiaryComment, DiaryEntry, NewDiaryEntry, validate_comment};
use crate::domain::users::user::Role;

pub struct CreateDiaryEntry<'a, R: DiaryRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: DiaryRepository + ?Sized> CreateDiaryEntry<'a, R> {
    pub async fn execute(&self, student_id: Uuid, entry: NewDiaryEntry) -> ServiceResult<DiaryEntry> {
        let entry = entry.validate()?;
        Ok(self.repo.create(student_id, &entry).await?)
    }
}

pub struct ListDiary<'a, R, U>
where
    R: DiaryRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    pub repo: &'a R,
    pub users: &'a U,
}

impl<'a, R, U> ListDiary<'a, R, U>
where
    R: DiaryRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    pub async fn mine(&self, student_id: Uuid) -> anyhow::Result<Vec<DiaryEntry>> {
        self.repo.list_for_students(&[student_id]).await
    }

    pub async fn for_student(&self, student_id: Uuid) -> ServiceResult<Vec<DiaryEntry>> {
        match self.users.find_by_id(student_id).await? {
            Some(u) if u.role == Role::Student => {}
            _ => return Err(ServiceError::NotFound("Student")),
        }
        Ok(self.repo.list_for_students(&[student_id]).await?)
    }
}

pub struct CommentOnDiary<'a, R: DiaryRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: DiaryRepository + ?Sized> CommentOnDiary<'a, R> {
    pub async fn execute(&self, author: &AuthUser, entry_id: Uuid, comment: &str) -> ServiceResult<DiaryComment> {
        let comment = validate_comment(comment)?;
        if self.repo.find(entry_id).await?.is_none() {
            return Err(ServiceError::NotFound("Diary entry"));
        }
        let comment = DiaryComment {
            id: Uuid::new_v4(),
            teacher_id: author.id,
            teacher_name: Some(author.name.clone()),
            comment,
            commented_at: Utc::now(),
        };
        self.repo.add_comment(entry_id, &comment).await?;
        tracing::debug!(diary_id = %entry_id, teacher_id = %author.id, "diary_comment_added");
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{InMemoryDiary, InMemoryUsers};

    fn entry(text: &str) -> NewDiaryEntry {
        NewDiaryEntry {
            entry: text.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn staff_list_a_students_diary() {
        let repo = InMemoryDiary::default();
        let users = InMemoryUsers::default();
        let student = users.seed("Asha", Role::Student, Some("6A"));
        let teacher = users.seed("Meera", Role::Teacher, None);
        CreateDiaryEntry { repo: &repo }
            .execute(student.id, entry("Won the quiz"))
            .await
            .unwrap();
        let list = ListDiary { repo: &repo, users: &users };
        assert_eq!(list.for_student(student.id).await.unwrap().len(), 1);
        assert_eq!(list.mine(student.id).await.unwrap()[0].entry, "Won the quiz");
        assert!(matches!(
            list.for_student(teacher.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn comments_carry_the_teacher_name() {
        let repo = InMemoryDiary::default();
        let created = CreateDiaryEntry { repo: &repo }
            .execute(Uuid::new_v4(), entry("Felt tired"))
            .await
            .unwrap();
        let author = AuthUser {
            id: Uuid::new_v4(),
            role: Role::Teacher,
            name: "Meera".into(),
            email: "meera@dps.in".into(),
        };
        let uc = CommentOnDiary { repo: &repo };
        uc.execute(&author, created.id, "Rest well").await.unwrap();
        let stored = repo.get(created.id).unwrap();
        assert_eq!(stored.teacher_comments[0].teacher_name.as_deref(), Some("Meera"));

        assert!(matches!(
            uc.execute(&author, Uuid::new_v4(), "Hello").await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            uc.execute(&author, created.id, " ").await,
            Err(ServiceError::Validation(_))
        ));
    }
}
