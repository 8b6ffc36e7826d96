use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::access::{ADMIN, AuthUser, require_role};
use crate::application::error::ServiceResult;
use crate::application::ports::admission_repository::AdmissionRepository;
use crate::application::ports::contact_repository::{ContactFilter, ContactRepository};
use crate::application::ports::event_repository::EventRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::realtime::watch_registry::WatchRegistry;
use crate::domain::admissions::admission::{Admission, AdmissionStatus};
use crate::domain::contact::contact::{ContactCounts, ContactMessage};
use crate::domain::events::event::EventView;
use crate::domain::realtime::change::{Collection, Room};
use crate::domain::users::user::{Role, User};

pub const ADMIN_WATCHES: &[Collection] = &[
    Collection::Users,
    Collection::Admissions,
    Collection::Events,
    Collection::Contact,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct AdmissionCounts {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub declined: usize,
}

impl AdmissionCounts {
    pub fn tally(admissions: &[Admission]) -> Self {
        let count = |s: AdmissionStatus| admissions.iter().filter(|a| a.status == s).count();
        AdmissionCounts {
            total: admissions.len(),
            pending: count(AdmissionStatus::Pending),
            approved: count(AdmissionStatus::Approved),
            declined: count(AdmissionStatus::Declined),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminDashboardData {
    pub namespace: String,
    pub students: Vec<User>,
    pub teachers: Vec<User>,
    pub admissions: Vec<Admission>,
    pub admission_counts: AdmissionCounts,
    pub events: Vec<EventView>,
    pub upcoming_events: usize,
    pub contacts: Vec<ContactMessage>,
    pub contact_counts: ContactCounts,
}

pub struct AdminDashboard<'a, U, A, E, C>
where
    U: UserRepository + ?Sized,
    A: AdmissionRepository + ?Sized,
    E: EventRepository + ?Sized,
    C: ContactRepository + ?Sized,
{
    pub users: &'a U,
    pub admissions: &'a A,
    pub events: &'a E,
    pub contacts: &'a C,
    pub watches: &'a WatchRegistry,
}

impl<'a, U, A, E, C> AdminDashboard<'a, U, A, E, C>
where
    U: UserRepository + ?Sized,
    A: AdmissionRepository + ?Sized,
    E: EventRepository + ?Sized,
    C: ContactRepository + ?Sized,
{
    pub async fn execute(&self, user: &AuthUser) -> ServiceResult<AdminDashboardData> {
        require_role(user, ADMIN)?;
        let now = Utc::now();
        let students = self.users.list_by_role(Role::Student).await?;
        let teachers = self.users.list_by_role(Role::Teacher).await?;
        let admissions = self.admissions.list().await?;
        let events: Vec<EventView> = self
            .events
            .list_active()
            .await?
            .iter()
            .map(|e| e.view(now))
            .collect();
        let contacts = self.contacts.list(ContactFilter::default()).await?;

        let namespace = Room::namespace(user.role, user.id);
        self.watches.register(namespace.clone(), ADMIN_WATCHES).await;
        tracing::debug!(namespace = %namespace, "dashboard_namespace_registered");

        Ok(AdminDashboardData {
            namespace: namespace.to_string(),
            admission_counts: AdmissionCounts::tally(&admissions),
            upcoming_events: events.iter().filter(|v| v.event.is_upcoming(now)).count(),
            contact_counts: ContactCounts::tally(contacts.iter().map(|c| &c.status)),
            students,
            teachers,
            admissions,
            events,
            contacts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::error::ServiceError;
    use crate::application::testing::*;
    use crate::domain::admissions::admission::NewAdmission;
    use crate::domain::contact::contact::{ContactStatus, NewContact};
    use crate::domain::events::event::EventScope;
    use crate::domain::events::event::tests::sample_event;

    fn auth(u: &User) -> AuthUser {
        AuthUser {
            id: u.id,
            role: u.role,
            name: u.name.clone(),
            email: u.email.clone(),
        }
    }

    #[tokio::test]
    async fn admin_dashboard_counts_and_registers_namespace() {
        let users = InMemoryUsers::default();
        let admissions = InMemoryAdmissions::default();
        let events = InMemoryEvents::default();
        let contacts = InMemoryContacts::default();
        let watches = WatchRegistry::new();
        let admin = users.seed("Principal", Role::Admin, None);
        users.seed("Asha", Role::Student, Some("6A"));
        users.seed("Meera", Role::Teacher, None);
        for name in ["Kiran", "Dev"] {
            admissions
                .create(&NewAdmission {
                    name: name.into(),
                    parent_number: "9876543210".into(),
                    email: format!("{}@example.com", name.to_lowercase()),
                    class: "1A".into(),
                    address: "Hyderabad".into(),
                })
                .await
                .unwrap();
        }
        events.insert(sample_event(Utc::now(), EventScope::School));
        let m = contacts
            .create(&NewContact {
                name: "Anil".into(),
                email: "anil@example.com".into(),
                subject: "Fees".into(),
                message: "Due?".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let mut closed = m.clone();
        closed.set_status(ContactStatus::Closed, None, Utc::now());
        contacts.update_status(&closed).await.unwrap();

        let uc = AdminDashboard {
            users: &users,
            admissions: &admissions,
            events: &events,
            contacts: &contacts,
            watches: &watches,
        };
        let data = uc.execute(&auth(&admin)).await.unwrap();
        assert_eq!(data.namespace, format!("admin-{}", admin.id));
        assert_eq!(data.students.len(), 1);
        assert_eq!(data.teachers.len(), 1);
        assert_eq!(data.admission_counts.pending, 2);
        assert_eq!(data.upcoming_events, 1);
        assert_eq!(data.contact_counts.resolved, 1);
        assert_eq!(
            watches.watchers(Collection::Admissions).await,
            vec![Room::namespace(Role::Admin, admin.id)]
        );

        let teacher = users.seed("Ravi", Role::Teacher, None);
        assert!(matches!(
            uc.execute(&auth(&teacher)).await,
            Err(ServiceError::Forbidden)
        ));
    }
}
