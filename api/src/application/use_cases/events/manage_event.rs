use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::access::AuthUser;
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::event_repository::EventRepository;
use crate::domain::events::event::{
    Attachment, Event, EventPatch, EventScope, EventSlot, EventSpec, EventType, EventView,
    Recurrence,
};
use crate::domain::users::user::Role;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    pub location: Option<String>,
    #[serde(default)]
    pub event_type: EventType,
    #[serde(default)]
    pub scope: EventScope,
    #[serde(default)]
    pub target_classes: Vec<String>,
    #[serde(default)]
    pub target_teachers: Vec<Uuid>,
    pub recurrence: Option<Recurrence>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub registration_required: bool,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub max_participants: Option<i32>,
    /// Create even when the slot clashes with another event.
    #[serde(default)]
    pub allow_conflict: bool,
}

impl CreateEventRequest {
    fn into_spec(self) -> EventSpec {
        EventSpec {
            title: self.title,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            all_day: self.all_day,
            location: self.location.filter(|l| !l.trim().is_empty()),
            event_type: self.event_type,
            scope: self.scope,
            target_classes: self.target_classes,
            target_teachers: self.target_teachers,
            recurrence: self.recurrence,
            attachments: self.attachments,
            registration_required: self.registration_required,
            registration_deadline: self.registration_deadline,
            max_participants: self.max_participants,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateEventRequest {
    #[serde(flatten)]
    pub patch: EventPatch,
    #[serde(default)]
    pub allow_conflict: bool,
}

async fn ensure_free<R: EventRepository + ?Sized>(repo: &R, slot: &EventSlot<'_>) -> ServiceResult<()> {
    let clashes: Vec<String> = repo
        .list_overlapping(slot.start, slot.end)
        .await?
        .iter()
        .filter(|e| slot.conflicts_with(&e.slot()))
        .map(|e| e.title.clone())
        .collect();
    if clashes.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::conflict(format!(
            "Event conflicts with: {}",
            clashes.join(", ")
        )))
    }
}

fn ensure_manager(event: &Event, user: &AuthUser) -> ServiceResult<()> {
    match user.role {
        Role::Admin => Ok(()),
        Role::Teacher if event.created_by == user.id => Ok(()),
        _ => Err(ServiceError::Forbidden),
    }
}

async fn load_live<R: EventRepository + ?Sized>(repo: &R, id: Uuid) -> ServiceResult<Event> {
    match repo.find(id).await? {
        Some(e) if !e.is_deleted => Ok(e),
        _ => Err(ServiceError::NotFound("Event")),
    }
}

pub struct CreateEvent<'a, R: EventRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: EventRepository + ?Sized> CreateEvent<'a, R> {
    pub async fn execute(&self, user: &AuthUser, req: CreateEventRequest) -> ServiceResult<EventView> {
        let allow_conflict = req.allow_conflict;
        let spec = req.into_spec().validate()?;
        if !allow_conflict {
            ensure_free(self.repo, &spec.slot()).await?;
        }
        let event = self.repo.create(&spec, user.id).await?;
        tracing::info!(event_id = %event.id, scope = event.scope.as_str(), "event_created");
        Ok(event.view(Utc::now()))
    }
}

pub struct UpdateEvent<'a, R: EventRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: EventRepository + ?Sized> UpdateEvent<'a, R> {
    pub async fn execute(
        &self,
        user: &AuthUser,
        id: Uuid,
        req: UpdateEventRequest,
    ) -> ServiceResult<EventView> {
        let mut event = load_live(self.repo, id).await?;
        ensure_manager(&event, user)?;
        let now = Utc::now();
        event.apply(req.patch, user.id, now)?;
        if !req.allow_conflict && event.is_active {
            ensure_free(self.repo, &event.slot()).await?;
        }
        self.repo.update(&event).await?;
        tracing::info!(event_id = %event.id, "event_updated");
        Ok(event.view(now))
    }
}

pub struct DeleteEvent<'a, R: EventRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: EventRepository + ?Sized> DeleteEvent<'a, R> {
    pub async fn execute(&self, user: &AuthUser, id: Uuid) -> ServiceResult<()> {
        let mut event = load_live(self.repo, id).await?;
        ensure_manager(&event, user)?;
        event.is_deleted = true;
        event.is_active = false;
        event.last_updated_by = Some(user.id);
        event.updated_at = Utc::now();
        self.repo.update(&event).await?;
        tracing::info!(event_id = %event.id, actor = %user.id, "event_deleted");
        Ok(())
    }
}
