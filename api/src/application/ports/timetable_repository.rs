use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::timetables::timetable::{TimetableDraft, TimetableEntry};

#[async_trait]
pub trait TimetableRepository: Send + Sync {
    async fn list_for_class(&self, class: &str) -> anyhow::Result<Vec<TimetableEntry>>;
    async fn list_all(&self) -> anyhow::Result<Vec<TimetableEntry>>;
    async fn find(&self, id: Uuid) -> anyhow::Result<Option<TimetableEntry>>;
    async fn create(&self, draft: &TimetableDraft) -> anyhow::Result<TimetableEntry>;
    async fn update(&self, entry: &TimetableEntry) -> anyhow::Result<()>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}
