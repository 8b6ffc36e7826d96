use chrono::Utc;
use uuid::Uuid;

use crate::application::access::{AuthUser, resolve_viewer};
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::event_repository::{EventRepository, RegistrationOutcome};
use crate::application::ports::user_repository::UserRepository;
use crate::domain::events::event::RegistrationError;

impl From<RegistrationError> for ServiceError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::AlreadyRegistered | RegistrationError::Full => {
                ServiceError::Conflict(err.to_string())
            }
            RegistrationError::NotRequired
            | RegistrationError::DeadlinePassed
            | RegistrationError::Unavailable => ServiceError::BadRequest(err.to_string()),
        }
    }
}

pub struct RegisterForEvent<'a, R, U>
where
    R: EventRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    pub repo: &'a R,
    pub users: &'a U,
}

impl<'a, R, U> RegisterForEvent<'a, R, U>
where
    R: EventRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    pub async fn execute(&self, user: &AuthUser, event_id: Uuid) -> ServiceResult<()> {
        let viewer = resolve_viewer(self.users, user).await?;
        let event = match self.repo.find(event_id).await? {
            Some(e) if e.visible_to(&viewer) => e,
            _ => return Err(ServiceError::NotFound("Event")),
        };
        let now = Utc::now();
        let registered = self.repo.is_registered(event.id, user.id).await?;
        event.check_registration(now, registered)?;
        match self.repo.register(event.id, user.id, now).await? {
            RegistrationOutcome::Registered => {}
            RegistrationOutcome::AlreadyRegistered => {
                return Err(RegistrationError::AlreadyRegistered.into());
            }
            RegistrationOutcome::Full => return Err(RegistrationError::Full.into()),
        }
        tracing::info!(event_id = %event.id, user_id = %user.id, "event_registration");
        Ok(())
    }
}
