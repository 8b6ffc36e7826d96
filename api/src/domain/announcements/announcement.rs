use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::users::user::{Role, Viewer};
use crate::domain::validation::{self, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementKind {
    #[default]
    General,
    Academic,
    Event,
    Emergency,
    Reminder,
}

impl AnnouncementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncementKind::General => "general",
            AnnouncementKind::Academic => "academic",
            AnnouncementKind::Event => "event",
            AnnouncementKind::Emergency => "emergency",
            AnnouncementKind::Reminder => "reminder",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "general" => Some(AnnouncementKind::General),
            "academic" => Some(AnnouncementKind::Academic),
            "event" => Some(AnnouncementKind::Event),
            "emergency" => Some(AnnouncementKind::Emergency),
            "reminder" => Some(AnnouncementKind::Reminder),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl AnnouncementPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncementPriority::Low => "low",
            AnnouncementPriority::Medium => "medium",
            AnnouncementPriority::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(AnnouncementPriority::Low),
            "medium" => Some(AnnouncementPriority::Medium),
            "high" => Some(AnnouncementPriority::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    #[default]
    All,
    Students,
    Teachers,
    Parents,
    SpecificClass,
}

impl Audience {
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::All => "all",
            Audience::Students => "students",
            Audience::Teachers => "teachers",
            Audience::Parents => "parents",
            Audience::SpecificClass => "specific_class",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Audience::All),
            "students" => Some(Audience::Students),
            "teachers" => Some(Audience::Teachers),
            "parents" => Some(Audience::Parents),
            "specific_class" => Some(Audience::SpecificClass),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: AnnouncementKind,
    pub priority: AnnouncementPriority,
    pub target_audience: Audience,
    pub specific_classes: Vec<String>,
    pub scheduled_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Announcement {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.scheduled_at <= now && self.expires_at.is_none_or(|e| e > now)
    }

    /// Staff see every active announcement. Students see the ones meant for
    /// everybody, for students, or listing their class.
    pub fn visible_to(&self, viewer: &Viewer, now: DateTime<Utc>) -> bool {
        if !self.is_active {
            return false;
        }
        match viewer.role {
            Role::Admin => true,
            Role::Teacher => self.created_by == viewer.id || self.is_live(now),
            Role::Student => {
                self.is_live(now)
                    && (matches!(self.target_audience, Audience::All | Audience::Students)
                        || viewer
                            .class
                            .as_ref()
                            .is_some_and(|c| self.specific_classes.contains(c)))
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NewAnnouncement {
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: Option<AnnouncementKind>,
    #[serde(default)]
    pub priority: Option<AnnouncementPriority>,
    #[serde(default)]
    pub target_audience: Option<Audience>,
    #[serde(default)]
    pub specific_classes: Vec<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewAnnouncement {
    pub fn validate(self, now: DateTime<Utc>) -> Result<ValidAnnouncement, ValidationError> {
        let target_audience = self.target_audience.unwrap_or_default();
        let specific_classes: Vec<String> = self
            .specific_classes
            .iter()
            .filter_map(|c| validation::optional(Some(c.as_str())))
            .collect();
        if target_audience == Audience::SpecificClass && specific_classes.is_empty() {
            return Err(ValidationError::Rule(
                "At least one class must be listed for class announcements".into(),
            ));
        }
        let scheduled_at = self.scheduled_at.unwrap_or(now);
        if self.expires_at.is_some_and(|e| e <= scheduled_at) {
            return Err(ValidationError::Rule(
                "Expiry must be after the scheduled time".into(),
            ));
        }
        Ok(ValidAnnouncement {
            title: validation::required("title", &self.title)?,
            message: validation::required("message", &self.message)?,
            kind: self.kind.unwrap_or_default(),
            priority: self.priority.unwrap_or_default(),
            target_audience,
            specific_classes,
            scheduled_at,
            expires_at: self.expires_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ValidAnnouncement {
    pub title: String,
    pub message: String,
    pub kind: AnnouncementKind,
    pub priority: AnnouncementPriority,
    pub target_audience: Audience,
    pub specific_classes: Vec<String>,
    pub scheduled_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn announcement(audience: Audience, classes: &[&str]) -> Announcement {
        let now = Utc::now();
        Announcement {
            id: Uuid::new_v4(),
            title: "PTM".into(),
            message: "Parent teacher meeting on Saturday".into(),
            kind: AnnouncementKind::General,
            priority: AnnouncementPriority::Medium,
            target_audience: audience,
            specific_classes: classes.iter().map(|c| c.to_string()).collect(),
            scheduled_at: now - Duration::hours(1),
            expires_at: None,
            is_active: true,
            created_by: Uuid::new_v4(),
            created_by_name: None,
            created_at: now,
        }
    }

    fn student(class: &str) -> Viewer {
        Viewer {
            id: Uuid::new_v4(),
            role: Role::Student,
            class: Some(class.into()),
        }
    }

    #[test]
    fn students_see_their_audience_only() {
        let now = Utc::now();
        assert!(announcement(Audience::All, &[]).visible_to(&student("6A"), now));
        assert!(announcement(Audience::Students, &[]).visible_to(&student("6A"), now));
        assert!(!announcement(Audience::Teachers, &[]).visible_to(&student("6A"), now));
        let class = announcement(Audience::SpecificClass, &["6A"]);
        assert!(class.visible_to(&student("6A"), now));
        assert!(!class.visible_to(&student("6B"), now));
    }

    #[test]
    fn scheduled_and_expired_announcements_are_hidden_from_students() {
        let now = Utc::now();
        let mut a = announcement(Audience::All, &[]);
        a.scheduled_at = now + Duration::hours(2);
        assert!(!a.visible_to(&student("6A"), now));
        a.scheduled_at = now - Duration::days(2);
        a.expires_at = Some(now - Duration::days(1));
        assert!(!a.visible_to(&student("6A"), now));
        let admin = Viewer {
            id: Uuid::new_v4(),
            role: Role::Admin,
            class: None,
        };
        assert!(a.visible_to(&admin, now));
    }

    #[test]
    fn class_announcements_need_classes() {
        let now = Utc::now();
        let draft = NewAnnouncement {
            title: "Trip".into(),
            message: "Zoo trip".into(),
            target_audience: Some(Audience::SpecificClass),
            ..Default::default()
        };
        assert!(draft.clone().validate(now).is_err());
        let ok = NewAnnouncement {
            specific_classes: vec!["4C".into()],
            ..draft
        }
        .validate(now)
        .unwrap();
        assert_eq!(ok.scheduled_at, now);
        assert_eq!(ok.priority, AnnouncementPriority::Medium);
    }
}
