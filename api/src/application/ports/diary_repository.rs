use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::diary::diary::{DiaryComment, DiaryEntry, ValidDiaryEntry};

#[async_trait]
pub trait DiaryRepository: Send + Sync {
    async fn create(&self, student_id: Uuid, entry: &ValidDiaryEntry) -> anyhow::Result<DiaryEntry>;
    /// Most recent date first, comments included.
    async fn list_for_students(&self, student_ids: &[Uuid]) -> anyhow::Result<Vec<DiaryEntry>>;
    async fn find(&self, id: Uuid) -> anyhow::Result<Option<DiaryEntry>>;
    async fn add_comment(&self, entry_id: Uuid, comment: &DiaryComment) -> anyhow::Result<()>;
}
