use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::validation::{self, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AdmissionStatus {
    Pending,
    Approved,
    Declined,
}

impl AdmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdmissionStatus::Pending => "pending",
            AdmissionStatus::Approved => "approved",
            AdmissionStatus::Declined => "declined",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(AdmissionStatus::Pending),
            "approved" => Some(AdmissionStatus::Approved),
            "declined" => Some(AdmissionStatus::Declined),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    Approve,
    Decline,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Admission {
    pub id: Uuid,
    pub name: String,
    pub parent_number: String,
    pub email: String,
    pub class: String,
    pub address: String,
    pub status: AdmissionStatus,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub declined_by: Option<Uuid>,
    pub declined_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("admission is already {}", .0.as_str())]
pub struct AlreadyDecided(pub AdmissionStatus);

impl Admission {
    /// Applies an admin decision. Only pending applications can be decided.
    pub fn decide(
        &mut self,
        decision: AdmissionDecision,
        actor: Uuid,
        at: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<(), AlreadyDecided> {
        if self.status != AdmissionStatus::Pending {
            return Err(AlreadyDecided(self.status));
        }
        match decision {
            AdmissionDecision::Approve => {
                self.status = AdmissionStatus::Approved;
                self.approved_by = Some(actor);
                self.approved_at = Some(at);
            }
            AdmissionDecision::Decline => {
                self.status = AdmissionStatus::Declined;
                self.declined_by = Some(actor);
                self.declined_at = Some(at);
            }
        }
        if notes.is_some() {
            self.notes = notes;
        }
        self.updated_at = at;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewAdmission {
    pub name: String,
    pub parent_number: String,
    pub email: String,
    pub class: String,
    pub address: String,
}

impl NewAdmission {
    pub fn validate(self) -> Result<NewAdmission, ValidationError> {
        let parent_number = validation::phone("parent_number", &self.parent_number)?;
        Ok(NewAdmission {
            name: validation::required("name", &self.name)?,
            parent_number,
            email: validation::email("email", &self.email)?,
            class: validation::required("class", &self.class)?,
            address: validation::required("address", &self.address)?,
        })
    }
}

pub fn approval_message(student_name: &str, school_name: &str) -> String {
    format!(
        "Congratulations! Your admission application for {student_name} has been approved by {school_name}. \
         Please visit the school office within 7 days to complete the admission process."
    )
}

pub fn rejection_message(student_name: &str, school_name: &str) -> String {
    format!(
        "Thank you for your interest in {school_name}. Unfortunately, we cannot offer admission to \
         {student_name} at this time. We encourage you to apply again in the next academic year."
    )
}
