use chrono::Utc;

use crate::application::access::{AuthUser, resolve_viewer};
use crate::application::error::ServiceResult;
use crate::application::ports::announcement_repository::AnnouncementRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::domain::announcements::announcement::{Announcement, NewAnnouncement};

pub struct CreateAnnouncement<'a, R: AnnouncementRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: AnnouncementRepository + ?Sized> CreateAnnouncement<'a, R> {
    pub async fn execute(&self, author: &AuthUser, draft: NewAnnouncement) -> ServiceResult<Announcement> {
        let draft = draft.validate(Utc::now())?;
        let created = self.repo.create(&draft, author.id).await?;
        tracing::info!(
            announcement_id = %created.id,
            audience = created.target_audience.as_str(),
            "announcement_created"
        );
        Ok(created)
    }
}

pub struct ListAnnouncements<'a, R, U>
where
    R: AnnouncementRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    pub repo: &'a R,
    pub users: &'a U,
}

impl<'a, R, U> ListAnnouncements<'a, R, U>
where
    R: AnnouncementRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    pub async fn execute(&self, user: &AuthUser) -> ServiceResult<Vec<Announcement>> {
        let viewer = resolve_viewer(self.users, user).await?;
        let now = Utc::now();
        Ok(self
            .repo
            .list_active()
            .await?
            .into_iter()
            .filter(|a| a.visible_to(&viewer, now))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{InMemoryAnnouncements, InMemoryUsers};
    use crate::domain::announcements::announcement::Audience;
    use crate::domain::users::user::{Role, User};

    fn auth(u: &User) -> AuthUser {
        AuthUser {
            id: u.id,
            role: u.role,
            name: u.name.clone(),
            email: u.email.clone(),
        }
    }

    #[tokio::test]
    async fn students_only_get_their_announcements() {
        let repo = InMemoryAnnouncements::default();
        let users = InMemoryUsers::default();
        let teacher = users.seed("Meera", Role::Teacher, None);
        let student = users.seed("Asha", Role::Student, Some("6A"));
        let create = CreateAnnouncement { repo: &repo };
        for (title, audience, classes) in [
            ("Holiday", Audience::All, vec![]),
            ("Staff meeting", Audience::Teachers, vec![]),
            ("6A trip", Audience::SpecificClass, vec!["6A".to_string()]),
            ("7B trip", Audience::SpecificClass, vec!["7B".to_string()]),
        ] {
            create
                .execute(
                    &auth(&teacher),
                    NewAnnouncement {
                        title: title.into(),
                        message: "Details inside".into(),
                        target_audience: Some(audience),
                        specific_classes: classes,
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }
        let list = ListAnnouncements { repo: &repo, users: &users };
        let mut seen: Vec<_> = list
            .execute(&auth(&student))
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.title)
            .collect();
        seen.sort();
        assert_eq!(seen, vec!["6A trip".to_string(), "Holiday".to_string()]);
        assert_eq!(list.execute(&auth(&teacher)).await.unwrap().len(), 4);
    }
}
