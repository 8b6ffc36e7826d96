use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::announcements::announcement::{Announcement, ValidAnnouncement};

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    async fn create(
        &self,
        announcement: &ValidAnnouncement,
        created_by: Uuid,
    ) -> anyhow::Result<Announcement>;
    /// Active announcements, latest schedule first.
    async fn list_active(&self) -> anyhow::Result<Vec<Announcement>>;
    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Announcement>>;
}
