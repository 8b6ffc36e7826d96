use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::users::user::{Role, Viewer};
use crate::domain::validation::{self, ValidationError};

pub const MAX_TITLE: usize = 100;
pub const MAX_LOCATION: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Academic,
    Sports,
    Cultural,
    Holiday,
    Exam,
    Meeting,
    #[default]
    Other,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Academic => "academic",
            EventType::Sports => "sports",
            EventType::Cultural => "cultural",
            EventType::Holiday => "holiday",
            EventType::Exam => "exam",
            EventType::Meeting => "meeting",
            EventType::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "academic" => EventType::Academic,
            "sports" => EventType::Sports,
            "cultural" => EventType::Cultural,
            "holiday" => EventType::Holiday,
            "exam" => EventType::Exam,
            "meeting" => EventType::Meeting,
            "other" => EventType::Other,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventScope {
    #[default]
    School,
    Class,
    Teacher,
}

impl EventScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventScope::School => "school",
            EventScope::Class => "class",
            EventScope::Teacher => "teacher",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "school" => Some(EventScope::School),
            "class" => Some(EventScope::Class),
            "teacher" => Some(EventScope::Teacher),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Recurrence {
    pub frequency: Frequency,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub days_of_week: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Attachment {
    pub name: String,
    pub url: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub all_day: bool,
    pub location: Option<String>,
    pub event_type: EventType,
    pub created_by: Uuid,
    pub created_by_name: Option<String>,
    pub scope: EventScope,
    pub target_classes: Vec<String>,
    pub target_teachers: Vec<Uuid>,
    pub recurrence: Option<Recurrence>,
    pub attachments: Vec<Attachment>,
    pub registration_required: bool,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub max_participants: Option<i32>,
    pub participant_count: i64,
    pub is_active: bool,
    pub is_deleted: bool,
    pub last_updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Time window plus audience, the part of an event that conflict checks
/// look at.
#[derive(Debug, Clone)]
pub struct EventSlot<'a> {
    pub id: Option<Uuid>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub scope: EventScope,
    pub target_classes: &'a [String],
    pub target_teachers: &'a [Uuid],
}

impl EventSlot<'_> {
    pub fn overlaps(&self, other: &EventSlot<'_>) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn shares_audience(&self, other: &EventSlot<'_>) -> bool {
        match (self.scope, other.scope) {
            (EventScope::School, EventScope::School) => true,
            (EventScope::Class, EventScope::Class) => self
                .target_classes
                .iter()
                .any(|c| other.target_classes.contains(c)),
            (EventScope::Teacher, EventScope::Teacher) => self
                .target_teachers
                .iter()
                .any(|t| other.target_teachers.contains(t)),
            _ => false,
        }
    }

    pub fn conflicts_with(&self, other: &EventSlot<'_>) -> bool {
        if self.id.is_some() && self.id == other.id {
            return false;
        }
        self.overlaps(other) && self.shares_audience(other)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("Registration not required for this event")]
    NotRequired,
    #[error("Registration deadline has passed")]
    DeadlinePassed,
    #[error("Already registered for this event")]
    AlreadyRegistered,
    #[error("Event is full")]
    Full,
    #[error("Event is not available")]
    Unavailable,
}

impl Event {
    pub fn slot(&self) -> EventSlot<'_> {
        EventSlot {
            id: Some(self.id),
            start: self.start_date,
            end: self.end_date,
            scope: self.scope,
            target_classes: &self.target_classes,
            target_teachers: &self.target_teachers,
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_date - self.start_date).num_minutes()
    }

    pub fn is_happening_now(&self, now: DateTime<Utc>) -> bool {
        now >= self.start_date && now <= self.end_date
    }

    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start_date > now
    }

    pub fn is_listed(&self) -> bool {
        self.is_active && !self.is_deleted
    }

    /// School-wide events, the viewer's own events, class events aimed at
    /// the viewer's class and teacher events naming the viewer. Admins see
    /// everything.
    pub fn visible_to(&self, viewer: &Viewer) -> bool {
        if !self.is_listed() {
            return false;
        }
        if viewer.role == Role::Admin || self.created_by == viewer.id {
            return true;
        }
        match self.scope {
            EventScope::School => true,
            EventScope::Class => viewer
                .class
                .as_ref()
                .is_some_and(|c| self.target_classes.contains(c)),
            EventScope::Teacher => {
                viewer.role == Role::Teacher && self.target_teachers.contains(&viewer.id)
            }
        }
    }

    pub fn check_registration(
        &self,
        now: DateTime<Utc>,
        already_registered: bool,
    ) -> Result<(), RegistrationError> {
        if !self.is_listed() {
            return Err(RegistrationError::Unavailable);
        }
        if !self.registration_required {
            return Err(RegistrationError::NotRequired);
        }
        if self.registration_deadline.is_some_and(|d| now > d) {
            return Err(RegistrationError::DeadlinePassed);
        }
        if already_registered {
            return Err(RegistrationError::AlreadyRegistered);
        }
        if self
            .max_participants
            .is_some_and(|max| self.participant_count >= max as i64)
        {
            return Err(RegistrationError::Full);
        }
        Ok(())
    }

    pub fn view(&self, now: DateTime<Utc>) -> EventView {
        EventView {
            duration: self.duration_minutes(),
            is_happening_now: self.is_happening_now(now),
            event: self.clone(),
        }
    }

    pub fn apply(
        &mut self,
        patch: EventPatch,
        actor: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        let mut spec = self.spec();
        if let Some(v) = patch.title {
            spec.title = v;
        }
        if let Some(v) = patch.description {
            spec.description = v;
        }
        if let Some(v) = patch.start_date {
            spec.start_date = v;
        }
        if let Some(v) = patch.end_date {
            spec.end_date = v;
        }
        if let Some(v) = patch.all_day {
            spec.all_day = v;
        }
        if let Some(v) = patch.location {
            spec.location = validation::optional(Some(v.as_str()));
        }
        if let Some(v) = patch.event_type {
            spec.event_type = v;
        }
        if let Some(v) = patch.scope {
            spec.scope = v;
        }
        if let Some(v) = patch.target_classes {
            spec.target_classes = v;
        }
        if let Some(v) = patch.target_teachers {
            spec.target_teachers = v;
        }
        if patch.clear_recurrence {
            spec.recurrence = None;
        } else if let Some(v) = patch.recurrence {
            spec.recurrence = Some(v);
        }
        if let Some(v) = patch.attachments {
            spec.attachments = v;
        }
        if let Some(v) = patch.registration_required {
            spec.registration_required = v;
        }
        if let Some(v) = patch.registration_deadline {
            spec.registration_deadline = Some(v);
        }
        if let Some(v) = patch.max_participants {
            spec.max_participants = Some(v);
        }
        if let Some(v) = patch.is_active {
            spec.is_active = v;
        }
        let spec = spec.validate()?;

        self.title = spec.title;
        self.description = spec.description;
        self.start_date = spec.start_date;
        self.end_date = spec.end_date;
        self.all_day = spec.all_day;
        self.location = spec.location;
        self.event_type = spec.event_type;
        self.scope = spec.scope;
        self.target_classes = spec.target_classes;
        self.target_teachers = spec.target_teachers;
        self.recurrence = spec.recurrence;
        self.attachments = spec.attachments;
        self.registration_required = spec.registration_required;
        self.registration_deadline = spec.registration_deadline;
        self.max_participants = spec.max_participants;
        self.is_active = spec.is_active;
        self.last_updated_by = Some(actor);
        self.updated_at = at;
        Ok(())
    }

    fn spec(&self) -> EventSpec {
        EventSpec {
            title: self.title.clone(),
            description: self.description.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            all_day: self.all_day,
            location: self.location.clone(),
            event_type: self.event_type,
            scope: self.scope,
            target_classes: self.target_classes.clone(),
            target_teachers: self.target_teachers.clone(),
            recurrence: self.recurrence.clone(),
            attachments: self.attachments.clone(),
            registration_required: self.registration_required,
            registration_deadline: self.registration_deadline,
            max_participants: self.max_participants,
            is_active: self.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub duration: i64,
    pub is_happening_now: bool,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub all_day: Option<bool>,
    pub location: Option<String>,
    pub event_type: Option<EventType>,
    pub scope: Option<EventScope>,
    pub target_classes: Option<Vec<String>>,
    pub target_teachers: Option<Vec<Uuid>>,
    pub recurrence: Option<Recurrence>,
    /// Drops an existing recurrence rule.
    #[serde(default)]
    pub clear_recurrence: bool,
    pub attachments: Option<Vec<Attachment>>,
    pub registration_required: Option<bool>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub max_participants: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct EventSpec {
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub all_day: bool,
    pub location: Option<String>,
    pub event_type: EventType,
    pub scope: EventScope,
    pub target_classes: Vec<String>,
    pub target_teachers: Vec<Uuid>,
    pub recurrence: Option<Recurrence>,
    pub attachments: Vec<Attachment>,
    pub registration_required: bool,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub max_participants: Option<i32>,
    pub is_active: bool,
}

impl EventSpec {
    pub fn slot(&self) -> EventSlot<'_> {
        EventSlot {
            id: None,
            start: self.start_date,
            end: self.end_date,
            scope: self.scope,
            target_classes: &self.target_classes,
            target_teachers: &self.target_teachers,
        }
    }

    pub fn validate(mut self) -> Result<EventSpec, ValidationError> {
        self.title = validation::required_max("title", &self.title, MAX_TITLE)?;
        self.description = validation::required("description", &self.description)?;
        if let Some(loc) = &self.location {
            validation::max_len("location", loc, MAX_LOCATION)?;
        }
        if self.end_date <= self.start_date {
            return Err(ValidationError::Rule(
                "End date must be after start date".into(),
            ));
        }
        self.target_classes = self
            .target_classes
            .iter()
            .filter_map(|c| validation::optional(Some(c.as_str())))
            .collect();
        match self.scope {
            EventScope::Class if self.target_classes.is_empty() => {
                return Err(ValidationError::Rule(
                    "At least one class must be selected for class-scoped events".into(),
                ));
            }
            EventScope::Teacher if self.target_teachers.is_empty() => {
                return Err(ValidationError::Rule(
                    "At least one teacher must be selected for teacher-scoped events".into(),
                ));
            }
            _ => {}
        }
        if let Some(rec) = &self.recurrence {
            if rec.end_date <= self.start_date {
                return Err(ValidationError::Rule(
                    "Recurrence end date must be after start date".into(),
                ));
            }
            if rec.days_of_week.iter().any(|d| *d > 6) {
                return Err(ValidationError::OutOfRange {
                    field: "days_of_week",
                    min: 0,
                    max: 6,
                });
            }
            if rec.frequency == Frequency::Weekly && rec.days_of_week.is_empty() {
                return Err(ValidationError::Rule(
                    "Weekly recurring events must specify days of the week".into(),
                ));
            }
        }
        if let Some(max) = self.max_participants {
            validation::in_range("max_participants", max as i64, 1, i32::MAX as i64)?;
        }
        Ok(self)
    }
}
