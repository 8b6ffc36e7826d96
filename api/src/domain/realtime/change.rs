use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::domain::diary::diary::DiaryEntry;
use crate::domain::events::event::{Event, EventScope};
use crate::domain::quizzes::quiz::{Quiz, QuizSubmission};
use crate::domain::timetables::timetable::TimetableEntry;
use crate::domain::users::user::{Role, Viewer};

/// Tables that carry a change trigger. The wire name is what the trigger
/// writes into the notification payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Users,
    Admissions,
    Quizzes,
    QuizSubmissions,
    Events,
    Timetables,
    Diary,
    Contact,
    Announcements,
    Feedback,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Admissions => "admissions",
            Collection::Quizzes => "quizzes",
            Collection::QuizSubmissions => "quiz_submissions",
            Collection::Events => "events",
            Collection::Timetables => "timetables",
            Collection::Diary => "diary",
            Collection::Contact => "contact",
            Collection::Announcements => "announcements",
            Collection::Feedback => "feedback",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Insert,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

/// Payload of one `pg_notify` on the change channel. Only the key travels;
/// the document is looked up again before it is relayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotification {
    pub collection: Collection,
    pub operation: Operation,
    pub id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Room {
    Global,
    Class(String),
    /// Per-user dashboard room, `<role>-<user id>`.
    Namespace { role: Role, user_id: Uuid },
}

impl Room {
    pub fn class(name: impl Into<String>) -> Self {
        Room::Class(name.into())
    }

    pub fn namespace(role: Role, user_id: Uuid) -> Self {
        Room::Namespace { role, user_id }
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Room::Global => f.write_str("global"),
            Room::Class(c) => write!(f, "class:{c}"),
            Room::Namespace { role, user_id } => write!(f, "{}-{}", role.as_str(), user_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown room: {0}")]
pub struct UnknownRoom(pub String);

impl FromStr for Room {
    type Err = UnknownRoom;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "global" {
            return Ok(Room::Global);
        }
        if let Some(class) = s.strip_prefix("class:") {
            let class = class.trim();
            if class.is_empty() {
                return Err(UnknownRoom(s.to_string()));
            }
            return Ok(Room::Class(class.to_string()));
        }
        let (role, id) = s.split_once('-').ok_or_else(|| UnknownRoom(s.to_string()))?;
        let role = role.parse::<Role>().map_err(|_| UnknownRoom(s.to_string()))?;
        let user_id = Uuid::parse_str(id).map_err(|_| UnknownRoom(s.to_string()))?;
        Ok(Room::Namespace { role, user_id })
    }
}

/// One frame headed for every socket joined to any of `rooms`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundMessage {
    #[serde(skip)]
    pub rooms: Vec<Room>,
    pub event: String,
    pub data: Value,
}

impl OutboundMessage {
    pub fn new(event: impl Into<String>, data: Value, rooms: Vec<Room>) -> Self {
        Self {
            rooms,
            event: event.into(),
            data,
        }
    }

    pub fn addressed_to(&self, joined: &[Room]) -> bool {
        self.rooms.iter().any(|r| joined.contains(r))
    }
}

/// The document a change resolved to, as far as routing cares.
#[derive(Debug, Clone)]
pub enum ChangedDocument {
    Quiz(Box<Quiz>),
    Submission {
        submission: Box<QuizSubmission>,
        quiz_class: String,
    },
    Timetable(Box<TimetableEntry>),
    Event(Box<Event>),
    Diary(Box<DiaryEntry>),
    Other(Value),
}

impl ChangedDocument {
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        match self {
            ChangedDocument::Quiz(q) => serde_json::to_value(q),
            ChangedDocument::Submission { submission, .. } => serde_json::to_value(submission),
            ChangedDocument::Timetable(t) => serde_json::to_value(t),
            ChangedDocument::Event(e) => serde_json::to_value(e),
            ChangedDocument::Diary(d) => serde_json::to_value(d),
            ChangedDocument::Other(v) => Ok(v.clone()),
        }
    }

    /// What a student dashboard may see of this document. Answer keys are
    /// stripped. Other students' diaries and events outside the student's
    /// audience are withheld.
    pub fn student_json(
        &self,
        student: &Viewer,
        at: DateTime<Utc>,
    ) -> Result<Option<Value>, serde_json::Error> {
        match self {
            ChangedDocument::Quiz(q) => serde_json::to_value(q.student_view(at)).map(Some),
            ChangedDocument::Diary(d) if d.student_id != student.id => Ok(None),
            ChangedDocument::Submission { submission, .. } if submission.student_id != student.id => {
                Ok(None)
            }
            ChangedDocument::Event(e) if !e.visible_to(student) => Ok(None),
            other => other.to_json().map(Some),
        }
    }
}

fn lifecycle_event(prefix: &str, op: Operation) -> String {
    match op {
        Operation::Insert => format!("{prefix}:created"),
        Operation::Update => format!("{prefix}:updated"),
        Operation::Delete => format!("{prefix}:deleted"),
    }
}

/// Maps a change on a routed collection to its room messages. `document`
/// is `None` for deletes. Collections without a route yield nothing.
/// Global and class rooms are open, so quizzes go out without answer keys.
pub fn route(
    change: &ChangeNotification,
    document: Option<&ChangedDocument>,
    at: DateTime<Utc>,
) -> Result<Vec<OutboundMessage>, serde_json::Error> {
    let id = change.id.to_string();
    let out = match (change.collection, document) {
        (Collection::Quizzes, Some(ChangedDocument::Quiz(quiz))) if quiz.is_deleted => {
            vec![OutboundMessage::new(
                "quiz:deleted",
                json!({ "quizId": id }),
                vec![Room::Global],
            )]
        }
        (Collection::Quizzes, Some(ChangedDocument::Quiz(quiz))) => {
            vec![OutboundMessage::new(
                lifecycle_event("quiz", change.operation),
                json!({ "quiz": serde_json::to_value(quiz.student_view(at))? }),
                vec![Room::Global, Room::class(quiz.class.clone())],
            )]
        }
        (Collection::Quizzes, None) if change.operation == Operation::Delete => {
            vec![OutboundMessage::new(
                "quiz:deleted",
                json!({ "quizId": id }),
                vec![Room::Global],
            )]
        }
        (
            Collection::QuizSubmissions,
            Some(ChangedDocument::Submission {
                submission,
                quiz_class,
            }),
        ) if change.operation == Operation::Insert => {
            vec![OutboundMessage::new(
                "quiz:submitted",
                json!({
                    "quizId": submission.quiz_id,
                    "studentId": submission.student_id,
                    "score": submission.score,
                    "totalQuestions": submission.total_questions,
                }),
                vec![Room::class(quiz_class.clone())],
            )]
        }
        (Collection::Timetables, Some(ChangedDocument::Timetable(entry))) => {
            vec![OutboundMessage::new(
                lifecycle_event("timetable", change.operation),
                json!({ "timetable": serde_json::to_value(entry)? }),
                vec![Room::Global, Room::class(entry.class.clone())],
            )]
        }
        (Collection::Timetables, None) if change.operation == Operation::Delete => {
            vec![OutboundMessage::new(
                "timetable:deleted",
                json!({ "timetableId": id }),
                vec![Room::Global],
            )]
        }
        (Collection::Events, Some(ChangedDocument::Event(event))) if event.is_deleted => {
            vec![OutboundMessage::new(
                "event:deleted",
                json!({ "eventId": id }),
                vec![Room::Global],
            )]
        }
        (Collection::Events, Some(ChangedDocument::Event(event))) => {
            let mut rooms = vec![Room::Global];
            if event.scope == EventScope::Class {
                for class in &event.target_classes {
                    let room = Room::class(class.clone());
                    if !rooms.contains(&room) {
                        rooms.push(room);
                    }
                }
            }
            vec![OutboundMessage::new(
                lifecycle_event("event", change.operation),
                json!({ "event": serde_json::to_value(event)? }),
                rooms,
            )]
        }
        (Collection::Events, None) if change.operation == Operation::Delete => {
            vec![OutboundMessage::new(
                "event:deleted",
                json!({ "eventId": id }),
                vec![Room::Global],
            )]
        }
        _ => Vec::new(),
    };
    Ok(out)
}

/// The `dataChange` frames for the namespaces watching a collection. Staff
/// share one frame with the full document; each student gets their own
/// filtered copy. `students` carries the known profiles of watching
/// students; an unknown student is treated as having no class.
pub fn data_changes(
    change: &ChangeNotification,
    document: Option<&ChangedDocument>,
    namespaces: Vec<Room>,
    students: &[Viewer],
    at: DateTime<Utc>,
) -> Result<Vec<OutboundMessage>, serde_json::Error> {
    let Some(doc) = document else {
        if namespaces.is_empty() {
            return Ok(Vec::new());
        }
        return Ok(vec![data_change(change, None, namespaces, at)]);
    };
    let mut staff = Vec::new();
    let mut out = Vec::new();
    for room in namespaces {
        match room {
            Room::Namespace {
                role: Role::Student,
                user_id,
            } => {
                let student = students
                    .iter()
                    .find(|v| v.id == user_id)
                    .cloned()
                    .unwrap_or(Viewer {
                        id: user_id,
                        role: Role::Student,
                        class: None,
                    });
                if let Some(data) = doc.student_json(&student, at)? {
                    out.push(data_change(change, Some(data), vec![room], at));
                }
            }
            other => staff.push(other),
        }
    }
    if !staff.is_empty() {
        out.insert(0, data_change(change, Some(doc.to_json()?), staff, at));
    }
    Ok(out)
}

/// The `dataChange` frame sent to dashboard namespaces watching a
/// collection.
pub fn data_change(
    change: &ChangeNotification,
    document: Option<Value>,
    namespaces: Vec<Room>,
    at: DateTime<Utc>,
) -> OutboundMessage {
    let data = document.unwrap_or_else(|| json!({ "id": change.id }));
    OutboundMessage::new(
        "dataChange",
        json!({
            "collection": change.collection.as_str(),
            "operation": change.operation.as_str(),
            "data": data,
            "timestamp": at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }),
        namespaces,
    )
}
