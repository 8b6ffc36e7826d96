use uuid::Uuid;

use crate::application::error::ServiceResult;
use crate::application::ports::feedback_repository::FeedbackRepository;
use crate::domain::feedback::feedback::{Feedback, FeedbackWithStudent, NewFeedback};

pub struct CreateFeedback<'a, R: FeedbackRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: FeedbackRepository + ?Sized> CreateFeedback<'a, R> {
    pub async fn execute(&self, student_id: Uuid, feedback: NewFeedback) -> ServiceResult<Feedback> {
        let feedback = feedback.validate()?;
        Ok(self.repo.create(student_id, &feedback).await?)
    }
}

pub struct ListFeedback<'a, R: FeedbackRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: FeedbackRepository + ?Sized> ListFeedback<'a, R> {
    pub async fn all(&self) -> anyhow::Result<Vec<FeedbackWithStudent>> {
        self.repo.list_with_students().await
    }

    pub async fn mine(&self, student_id: Uuid) -> anyhow::Result<Vec<Feedback>> {
        self.repo.list_for_student(student_id).await
    }
}
