use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::validation::{self, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }

    /// Prefix used for generated member codes. Admins get none.
    pub fn code_prefix(&self) -> Option<&'static str> {
        match self {
            Role::Student => Some("STU"),
            Role::Teacher => Some("TCH"),
            Role::Admin => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            "admin" => Ok(Role::Admin),
            other => Err(ValidationError::Invalid {
                field: "role",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub member_code: Option<String>,
    pub class: Option<String>,
    pub section: Option<String>,
    pub subjects: Vec<String>,
    pub classes: Vec<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn viewer(&self) -> Viewer {
        Viewer {
            id: self.id,
            role: self.role,
            class: self.class.clone(),
        }
    }
}

/// The caller as seen by visibility rules (events, announcements).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub id: Uuid,
    pub role: Role,
    pub class: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Option<Role>,
    pub class: Option<String>,
    pub section: Option<String>,
    pub subjects: Vec<String>,
    pub classes: Vec<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidNewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub class: Option<String>,
    pub section: Option<String>,
    pub subjects: Vec<String>,
    pub classes: Vec<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl NewUser {
    pub fn validate(self) -> Result<ValidNewUser, ValidationError> {
        let name = validation::required("name", &self.name)?;
        let email = validation::email("email", &self.email)?;
        let role = self.role.ok_or(ValidationError::Required { field: "role" })?;
        let clean = |items: Vec<String>| -> Vec<String> {
            items
                .into_iter()
                .filter_map(|s| validation::optional(Some(s.as_str())))
                .collect()
        };
        Ok(ValidNewUser {
            name,
            email,
            role,
            class: validation::optional(self.class.as_deref()),
            section: validation::optional(self.section.as_deref()),
            subjects: clean(self.subjects),
            classes: clean(self.classes),
            phone: validation::optional(self.phone.as_deref()),
            address: validation::optional(self.address.as_deref()),
        })
    }
}

/// Formats the n-th member code of a role, e.g. `STU0007`.
pub fn member_code(role: Role, n: i64) -> Option<String> {
    role.code_prefix().map(|p| format!("{p}{n:04}"))
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Student, Role::Teacher, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("principal".parse::<Role>().is_err());
    }

    #[test]
    fn member_codes_are_zero_padded_per_role() {
        assert_eq!(member_code(Role::Student, 1).as_deref(), Some("STU0001"));
        assert_eq!(member_code(Role::Teacher, 42).as_deref(), Some("TCH0042"));
        assert_eq!(member_code(Role::Student, 12345).as_deref(), Some("STU12345"));
        assert_eq!(member_code(Role::Admin, 3), None);
    }

    #[test]
    fn new_user_requires_role() {
        let err = NewUser {
            name: "Ravi".into(),
            email: "ravi@dps.in".into(),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, ValidationError::Required { field: "role" });
    }

    #[test]
    fn new_user_drops_blank_subjects() {
        let user = NewUser {
            name: "Meera".into(),
            email: "Meera@DPS.in".into(),
            role: Some(Role::Teacher),
            subjects: vec!["Maths".into(), "  ".into()],
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(user.email, "meera@dps.in");
        assert_eq!(user.subjects, vec!["Maths".to_string()]);
    }
}
