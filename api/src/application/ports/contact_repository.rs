use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::contact::contact::{
    ContactCategory, ContactMessage, ContactReply, ContactStatus, NewContact,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ContactFilter {
    pub status: Option<ContactStatus>,
    pub category: Option<ContactCategory>,
}

#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn create(&self, contact: &NewContact) -> anyhow::Result<ContactMessage>;
    /// Newest first.
    async fn list(&self, filter: ContactFilter) -> anyhow::Result<Vec<ContactMessage>>;
    async fn find(&self, id: Uuid) -> anyhow::Result<Option<ContactMessage>>;
    async fn update_status(&self, contact: &ContactMessage) -> anyhow::Result<()>;
    async fn add_reply(&self, contact: &ContactMessage, reply: &ContactReply) -> anyhow::Result<()>;
}
