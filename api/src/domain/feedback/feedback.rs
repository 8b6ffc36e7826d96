use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::validation::{self, ValidationError};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Feedback {
    pub id: Uuid,
    pub student_id: Uuid,
    pub title: String,
    pub message: String,
    pub rating: Option<i16>,
    pub created_at: DateTime<Utc>,
}

/// Staff listing row, joined with the author.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeedbackWithStudent {
    #[serde(flatten)]
    pub feedback: Feedback,
    pub student_name: Option<String>,
    pub student_email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NewFeedback {
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub rating: Option<i16>,
}

impl NewFeedback {
    pub fn validate(self) -> Result<NewFeedback, ValidationError> {
        if let Some(r) = self.rating {
            validation::in_range("rating", r as i64, 1, 5)?;
        }
        Ok(NewFeedback {
            title: validation::required("title", &self.title)?,
            message: validation::required("message", &self.message)?,
            rating: self.rating,
        })
    }
}
