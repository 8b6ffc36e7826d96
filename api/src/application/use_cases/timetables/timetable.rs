use chrono::Utc;
use uuid::Uuid;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::timetable_repository::TimetableRepository;
use crate::domain::timetables::timetable::{
    TimetableDraft, TimetableEntry, TimetablePatch, sort_schedule,
};

pub struct ListTimetable<'a, R: TimetableRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: TimetableRepository + ?Sized> ListTimetable<'a, R> {
    pub async fn for_class(&self, class: &str) -> anyhow::Result<Vec<TimetableEntry>> {
        let mut rows = self.repo.list_for_class(class.trim()).await?;
        sort_schedule(&mut rows);
        Ok(rows)
    }

    pub async fn all(&self) -> anyhow::Result<Vec<TimetableEntry>> {
        let mut rows = self.repo.list_all().await?;
        sort_schedule(&mut rows);
        Ok(rows)
    }
}

pub struct CreateTimetableEntry<'a, R: TimetableRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: TimetableRepository + ?Sized> CreateTimetableEntry<'a, R> {
    pub async fn execute(&self, draft: TimetableDraft) -> ServiceResult<TimetableEntry> {
        let draft = draft.validate()?;
        let entry = self.repo.create(&draft).await?;
        tracing::info!(timetable_id = %entry.id, class = %entry.class, "timetable_entry_created");
        Ok(entry)
    }
}

pub struct UpdateTimetableEntry<'a, R: TimetableRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: TimetableRepository + ?Sized> UpdateTimetableEntry<'a, R> {
    pub async fn execute(&self, id: Uuid, patch: TimetablePatch) -> ServiceResult<TimetableEntry> {
        let mut entry = self
            .repo
            .find(id)
            .await?
            .ok_or(ServiceError::NotFound("Timetable entry"))?;
        entry.apply(patch, Utc::now())?;
        self.repo.update(&entry).await?;
        Ok(entry)
    }
}

pub struct DeleteTimetableEntry<'a, R: TimetableRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: TimetableRepository + ?Sized> DeleteTimetableEntry<'a, R> {
    pub async fn execute(&self, id: Uuid) -> ServiceResult<()> {
        if !self.repo.delete(id).await? {
            return Err(ServiceError::NotFound("Timetable entry"));
        }
        tracing::info!(timetable_id = %id, "timetable_entry_deleted");
        Ok(())
    }
}
