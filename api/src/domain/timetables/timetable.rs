use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::validation::{self, ValidationError};

pub const MAX_PERIOD: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "Monday" => Weekday::Monday,
            "Tuesday" => Weekday::Tuesday,
            "Wednesday" => Weekday::Wednesday,
            "Thursday" => Weekday::Thursday,
            "Friday" => Weekday::Friday,
            "Saturday" => Weekday::Saturday,
            "Sunday" => Weekday::Sunday,
            other => {
                return Err(ValidationError::Invalid {
                    field: "day",
                    value: other.to_string(),
                });
            }
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TimetableEntry {
    pub id: Uuid,
    pub class: String,
    pub day: Weekday,
    pub period: i32,
    pub subject: String,
    pub teacher: String,
    pub room: String,
    pub start_time: String,
    pub end_time: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimetableEntry {
    pub fn apply(&mut self, patch: TimetablePatch, at: DateTime<Utc>) -> Result<(), ValidationError> {
        let draft = TimetableDraft {
            class: patch.class.unwrap_or_else(|| self.class.clone()),
            day: patch.day.unwrap_or(self.day),
            period: patch.period.unwrap_or(self.period),
            subject: patch.subject.unwrap_or_else(|| self.subject.clone()),
            teacher: patch.teacher.unwrap_or_else(|| self.teacher.clone()),
            room: patch.room.unwrap_or_else(|| self.room.clone()),
            start_time: patch.start_time.unwrap_or_else(|| self.start_time.clone()),
            end_time: patch.end_time.unwrap_or_else(|| self.end_time.clone()),
        }
        .validate()?;
        self.class = draft.class;
        self.day = draft.day;
        self.period = draft.period;
        self.subject = draft.subject;
        self.teacher = draft.teacher;
        self.room = draft.room;
        self.start_time = draft.start_time;
        self.end_time = draft.end_time;
        self.updated_at = at;
        Ok(())
    }
}

/// Week order, then period.
pub fn schedule_order(a: &TimetableEntry, b: &TimetableEntry) -> Ordering {
    a.day.cmp(&b.day).then(a.period.cmp(&b.period))
}

pub fn sort_schedule(entries: &mut [TimetableEntry]) {
    entries.sort_by(|a, b| a.class.cmp(&b.class).then(schedule_order(a, b)));
}

pub fn parse_clock(field: &'static str, value: &str) -> Result<NaiveTime, ValidationError> {
    let v = value.trim();
    let well_formed = v.len() == 5 && v.as_bytes()[2] == b':';
    match NaiveTime::parse_from_str(v, "%H:%M") {
        Ok(t) if well_formed => Ok(t),
        _ => Err(ValidationError::Invalid {
            field,
            value: v.to_string(),
        }),
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TimetableDraft {
    pub class: String,
    pub day: Weekday,
    pub period: i32,
    pub subject: String,
    pub teacher: String,
    pub room: String,
    pub start_time: String,
    pub end_time: String,
}

impl TimetableDraft {
    pub fn validate(self) -> Result<TimetableDraft, ValidationError> {
        validation::in_range("period", self.period as i64, 1, MAX_PERIOD as i64)?;
        let start = parse_clock("start_time", &self.start_time)?;
        let end = parse_clock("end_time", &self.end_time)?;
        if end <= start {
            return Err(ValidationError::Rule(
                "End time must be after start time".into(),
            ));
        }
        Ok(TimetableDraft {
            class: validation::required("class", &self.class)?,
            day: self.day,
            period: self.period,
            subject: validation::required("subject", &self.subject)?,
            teacher: validation::required("teacher", &self.teacher)?,
            room: validation::required("room", &self.room)?,
            start_time: start.format("%H:%M").to_string(),
            end_time: end.format("%H:%M").to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TimetablePatch {
    pub class: Option<String>,
    pub day: Option<Weekday>,
    pub period: Option<i32>,
    pub subject: Option<String>,
    pub teacher: Option<String>,
    pub room: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> TimetableDraft {
        TimetableDraft {
            class: " 6A ".into(),
            day: Weekday::Tuesday,
            period: 2,
            subject: "Science".into(),
            teacher: "Mrs. Rao".into(),
            room: "Lab 1".into(),
            start_time: "09:45".into(),
            end_time: "10:30".into(),
        }
    }

    fn entry(class: &str, day: Weekday, period: i32) -> TimetableEntry {
        let now = Utc::now();
        TimetableEntry {
            id: Uuid::new_v4(),
            class: class.into(),
            day,
            period,
            subject: "Maths".into(),
            teacher: "Mr. Iyer".into(),
            room: "101".into(),
            start_time: "08:00".into(),
            end_time: "08:45".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn draft_is_trimmed_and_checked() {
        let d = draft().validate().unwrap();
        assert_eq!(d.class, "6A");

        let mut bad = draft();
        bad.period = 9;
        assert!(matches!(
            bad.validate(),
            Err(ValidationError::OutOfRange { field: "period", .. })
        ));

        let mut bad = draft();
        bad.end_time = "09:45".into();
        assert!(bad.validate().is_err());

        let mut bad = draft();
        bad.start_time = "9:45".into();
        assert!(matches!(
            bad.validate(),
            Err(ValidationError::Invalid { field: "start_time", .. })
        ));
    }

    #[test]
    fn schedule_sorts_by_week_order_then_period() {
        let mut rows = vec![
            entry("6A", Weekday::Friday, 1),
            entry("6A", Weekday::Monday, 3),
            entry("6A", Weekday::Monday, 1),
            entry("5B", Weekday::Sunday, 1),
        ];
        sort_schedule(&mut rows);
        let order: Vec<_> = rows.iter().map(|r| (r.class.as_str(), r.day, r.period)).collect();
        assert_eq!(
            order,
            vec![
                ("5B", Weekday::Sunday, 1),
                ("6A", Weekday::Monday, 1),
                ("6A", Weekday::Monday, 3),
                ("6A", Weekday::Friday, 1),
            ]
        );
    }

    #[test]
    fn weekday_parses_capitalised_names() {
        assert_eq!("Wednesday".parse::<Weekday>().unwrap(), Weekday::Wednesday);
        assert!("wed".parse::<Weekday>().is_err());
    }

    #[test]
    fn patch_keeps_entry_on_error() {
        let mut e = entry("6A", Weekday::Monday, 1);
        let err = e.apply(
            TimetablePatch {
                period: Some(0),
                subject: Some("Art".into()),
                ..Default::default()
            },
            Utc::now(),
        );
        assert!(err.is_err());
        assert_eq!(e.subject, "Maths");

        e.apply(
            TimetablePatch {
                room: Some("202".into()),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(e.room, "202");
    }
}
