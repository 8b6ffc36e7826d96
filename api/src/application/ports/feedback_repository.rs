use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::feedback::feedback::{Feedback, FeedbackWithStudent, NewFeedback};

#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn create(&self, student_id: Uuid, feedback: &NewFeedback) -> anyhow::Result<Feedback>;
    async fn list_with_students(&self) -> anyhow::Result<Vec<FeedbackWithStudent>>;
    async fn list_for_student(&self, student_id: Uuid) -> anyhow::Result<Vec<Feedback>>;
    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Feedback>>;
}
