use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::events::event::{Event, EventSpec};

/// Result of a capacity-checked registration insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered,
    AlreadyRegistered,
    Full,
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, spec: &EventSpec, created_by: Uuid) -> anyhow::Result<Event>;
    /// Active, non-deleted events ordered by start.
    async fn list_active(&self) -> anyhow::Result<Vec<Event>>;
    /// Active events intersecting `[start, end)`.
    async fn list_overlapping(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Event>>;
    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Event>>;
    async fn update(&self, event: &Event) -> anyhow::Result<()>;
    async fn is_registered(&self, event_id: Uuid, user_id: Uuid) -> anyhow::Result<bool>;
    /// Inserts the registration unless the event already holds
    /// `max_participants` registrations. Capacity is counted under the same
    /// lock as the insert.
    async fn register(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> anyhow::Result<RegistrationOutcome>;
}
