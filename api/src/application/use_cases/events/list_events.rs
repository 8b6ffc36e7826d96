use chrono::Utc;

use crate::application::access::{AuthUser, resolve_viewer};
use crate::application::error::ServiceResult;
use crate::application::ports::event_repository::EventRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::domain::events::event::EventView;

pub struct ListEvents<'a, R, U>
where
    R: EventRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    pub repo: &'a R,
    pub users: &'a U,
}

impl<'a, R, U> ListEvents<'a, R, U>
where
    R: EventRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    /// Events the caller may see, ordered by start.
    pub async fn execute(&self, user: &AuthUser) -> ServiceResult<Vec<EventView>> {
        let viewer = resolve_viewer(self.users, user).await?;
        let now = Utc::now();
        Ok(self
            .repo
            .list_active()
            .await?
            .iter()
            .filter(|e| e.visible_to(&viewer))
            .map(|e| e.view(now))
            .collect())
    }

    pub async fn upcoming(&self, user: &AuthUser, limit: usize) -> ServiceResult<Vec<EventView>> {
        let now = Utc::now();
        Ok(self
            .execute(user)
            .await?
            .into_iter()
            .filter(|v| v.event.is_upcoming(now))
            .take(limit)
            .collect())
    }
}
