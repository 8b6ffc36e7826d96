use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::validation::{self, ValidationError};

/// The fixed set of moods a student can tag an entry with.
pub const MOODS: [&str; 10] = ["😊", "😄", "😌", "😔", "😢", "😴", "🤩", "😎", "😤", "😅"];
pub const DEFAULT_MOOD: &str = "😊";

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DiaryComment {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub teacher_name: Option<String>,
    pub comment: String,
    pub commented_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DiaryEntry {
    pub id: Uuid,
    pub student_id: Uuid,
    pub student_name: Option<String>,
    pub date: DateTime<Utc>,
    pub entry: String,
    pub mood: String,
    pub tags: Vec<String>,
    pub is_private: bool,
    pub teacher_comments: Vec<DiaryComment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NewDiaryEntry {
    pub entry: String,
    pub mood: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_private: Option<bool>,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidDiaryEntry {
    pub entry: String,
    pub mood: String,
    pub tags: Vec<String>,
    pub is_private: bool,
    pub date: Option<DateTime<Utc>>,
}

impl NewDiaryEntry {
    pub fn validate(self) -> Result<ValidDiaryEntry, ValidationError> {
        let entry = validation::required("entry", &self.entry)?;
        let mood = match validation::optional(self.mood.as_deref()) {
            None => DEFAULT_MOOD.to_string(),
            Some(m) if MOODS.contains(&m.as_str()) => m,
            Some(m) => return Err(ValidationError::Invalid { field: "mood", value: m }),
        };
        Ok(ValidDiaryEntry {
            entry,
            mood,
            tags: self
                .tags
                .iter()
                .filter_map(|t| validation::optional(Some(t.as_str())))
                .collect(),
            is_private: self.is_private.unwrap_or(true),
            date: self.date,
        })
    }
}

pub fn validate_comment(comment: &str) -> Result<String, ValidationError> {
    validation::required("comment", comment)
}
