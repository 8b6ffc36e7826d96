use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::validation::{self, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    New,
    Read,
    Replied,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContactPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContactCategory {
    #[default]
    General,
    Admission,
    Academic,
    Transport,
    Fees,
    Complaint,
    Suggestion,
}

impl ContactPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactPriority::Low => "low",
            ContactPriority::Medium => "medium",
            ContactPriority::High => "high",
            ContactPriority::Urgent => "urgent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(ContactPriority::Low),
            "medium" => Some(ContactPriority::Medium),
            "high" => Some(ContactPriority::High),
            "urgent" => Some(ContactPriority::Urgent),
            _ => None,
        }
    }
}

impl ContactCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactCategory::General => "general",
            ContactCategory::Admission => "admission",
            ContactCategory::Academic => "academic",
            ContactCategory::Transport => "transport",
            ContactCategory::Fees => "fees",
            ContactCategory::Complaint => "complaint",
            ContactCategory::Suggestion => "suggestion",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "general" => ContactCategory::General,
            "admission" => ContactCategory::Admission,
            "academic" => ContactCategory::Academic,
            "transport" => ContactCategory::Transport,
            "fees" => ContactCategory::Fees,
            "complaint" => ContactCategory::Complaint,
            "suggestion" => ContactCategory::Suggestion,
            _ => return None,
        })
    }
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::New => "new",
            ContactStatus::Read => "read",
            ContactStatus::Replied => "replied",
            ContactStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(ContactStatus::New),
            "read" => Some(ContactStatus::Read),
            "replied" => Some(ContactStatus::Replied),
            "closed" => Some(ContactStatus::Closed),
            _ => None,
        }
    }

    /// New and read messages still wait on the office.
    pub fn is_pending(&self) -> bool {
        matches!(self, ContactStatus::New | ContactStatus::Read)
    }

    pub fn is_resolved(&self) -> bool {
        !self.is_pending()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContactReply {
    pub id: Uuid,
    pub replied_by: Uuid,
    pub reply_message: String,
    pub replied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub status: ContactStatus,
    pub priority: ContactPriority,
    pub category: ContactCategory,
    pub assigned_to: Option<Uuid>,
    pub replies: Vec<ContactReply>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContactMessage {
    pub fn set_status(&mut self, status: ContactStatus, assigned_to: Option<Uuid>, at: DateTime<Utc>) {
        self.status = status;
        if assigned_to.is_some() {
            self.assigned_to = assigned_to;
        }
        if status == ContactStatus::Closed {
            self.resolved_at = Some(at);
        }
        self.updated_at = at;
    }

    pub fn reply(
        &mut self,
        by: Uuid,
        message: &str,
        at: DateTime<Utc>,
    ) -> Result<ContactReply, ValidationError> {
        let reply = ContactReply {
            id: Uuid::new_v4(),
            replied_by: by,
            reply_message: validation::required("reply_message", message)?,
            replied_at: at,
        };
        self.replies.push(reply.clone());
        self.status = ContactStatus::Replied;
        self.updated_at = at;
        Ok(reply)
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub category: Option<ContactCategory>,
    pub priority: Option<ContactPriority>,
}

impl NewContact {
    pub fn validate(self) -> Result<NewContact, ValidationError> {
        Ok(NewContact {
            name: validation::required("name", &self.name)?,
            email: validation::email("email", &self.email)?,
            phone: validation::optional(self.phone.as_deref()),
            subject: validation::required("subject", &self.subject)?,
            message: validation::required("message", &self.message)?,
            category: Some(self.category.unwrap_or_default()),
            priority: Some(self.priority.unwrap_or_default()),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ContactCounts {
    pub total: i64,
    pub pending: i64,
    pub resolved: i64,
}

impl ContactCounts {
    pub fn tally<'a>(statuses: impl IntoIterator<Item = &'a ContactStatus>) -> Self {
        statuses.into_iter().fold(ContactCounts::default(), |mut acc, s| {
            acc.total += 1;
            if s.is_pending() {
                acc.pending += 1;
            } else {
                acc.resolved += 1;
            }
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> ContactMessage {
        let now = Utc::now();
        ContactMessage {
            id: Uuid::new_v4(),
            name: "Anil".into(),
            email: "anil@example.com".into(),
            phone: None,
            subject: "Bus route".into(),
            message: "Is there a bus from Kondapur?".into(),
            status: ContactStatus::New,
            priority: ContactPriority::Medium,
            category: ContactCategory::Transport,
            assigned_to: None,
            replies: vec![],
            resolved_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn closing_sets_resolved_at() {
        let mut m = message();
        let at = Utc::now();
        m.set_status(ContactStatus::Read, None, at);
        assert!(m.resolved_at.is_none());
        m.set_status(ContactStatus::Closed, None, at);
        assert_eq!(m.resolved_at, Some(at));
    }

    #[test]
    fn reply_marks_message_replied() {
        let mut m = message();
        let admin = Uuid::new_v4();
        m.reply(admin, "Yes, route 4.", Utc::now()).unwrap();
        assert_eq!(m.status, ContactStatus::Replied);
        assert_eq!(m.replies.len(), 1);
        assert_eq!(m.replies[0].replied_by, admin);
        assert!(m.reply(admin, " ", Utc::now()).is_err());
        assert_eq!(m.replies.len(), 1);
    }

    #[test]
    fn counts_split_pending_and_resolved() {
        let statuses = [
            ContactStatus::New,
            ContactStatus::Read,
            ContactStatus::Replied,
            ContactStatus::Closed,
            ContactStatus::New,
        ];
        assert_eq!(
            ContactCounts::tally(&statuses),
            ContactCounts {
                total: 5,
                pending: 3,
                resolved: 2
            }
        );
    }

    #[test]
    fn new_contact_fills_defaults() {
        let c = NewContact {
            name: "Anil".into(),
            email: "ANIL@example.com".into(),
            subject: "Fees".into(),
            message: "Due date?".into(),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(c.email, "anil@example.com");
        assert_eq!(c.category, Some(ContactCategory::General));
        assert_eq!(c.priority, Some(ContactPriority::Medium));
        assert_eq!(ContactCategory::parse("fees"), Some(ContactCategory::Fees));
    }
}
