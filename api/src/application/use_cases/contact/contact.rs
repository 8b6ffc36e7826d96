use chrono::Utc;
use uuid::Uuid;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::contact_repository::{ContactFilter, ContactRepository};
use crate::domain::contact::contact::{ContactMessage, ContactReply, ContactStatus, NewContact};

pub struct SubmitContact<'a, R: ContactRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ContactRepository + ?Sized> SubmitContact<'a, R> {
    pub async fn execute(&self, contact: NewContact) -> ServiceResult<ContactMessage> {
        let contact = contact.validate()?;
        let created = self.repo.create(&contact).await?;
        tracing::info!(contact_id = %created.id, category = created.category.as_str(), "contact_message_received");
        Ok(created)
    }
}

pub struct ListContacts<'a, R: ContactRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ContactRepository + ?Sized> ListContacts<'a, R> {
    pub async fn execute(&self, filter: ContactFilter) -> anyhow::Result<Vec<ContactMessage>> {
        self.repo.list(filter).await
    }
}

async fn load<R: ContactRepository + ?Sized>(repo: &R, id: Uuid) -> ServiceResult<ContactMessage> {
    repo.find(id)
        .await?
        .ok_or(ServiceError::NotFound("Contact message"))
}

pub struct UpdateContactStatus<'a, R: ContactRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ContactRepository + ?Sized> UpdateContactStatus<'a, R> {
    pub async fn execute(
        &self,
        id: Uuid,
        status: ContactStatus,
        assigned_to: Option<Uuid>,
    ) -> ServiceResult<ContactMessage> {
        let mut contact = load(self.repo, id).await?;
        contact.set_status(status, assigned_to, Utc::now());
        self.repo.update_status(&contact).await?;
        Ok(contact)
    }
}

pub struct ReplyToContact<'a, R: ContactRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ContactRepository + ?Sized> ReplyToContact<'a, R> {
    pub async fn execute(&self, id: Uuid, by: Uuid, message: &str) -> ServiceResult<ContactReply> {
        let mut contact = load(self.repo, id).await?;
        let reply = contact.reply(by, message, Utc::now())?;
        self.repo.add_reply(&contact, &reply).await?;
        tracing::info!(contact_id = %contact.id, replied_by = %by, "contact_replied");
        Ok(reply)
    }
}
