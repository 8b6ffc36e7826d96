//! In-memory port implementations used by the use-case and relay tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::stream::{self, BoxStream, StreamExt};
use uuid::Uuid;

use crate::application::ports::admission_repository::AdmissionRepository;
use crate::application::ports::announcement_repository::AnnouncementRepository;
use crate::application::ports::change_feed::ChangeFeed;
use crate::application::ports::contact_repository::{ContactFilter, ContactRepository};
use crate::application::ports::diary_repository::DiaryRepository;
use crate::application::ports::event_repository::{EventRepository, RegistrationOutcome};
use crate::application::ports::feedback_repository::FeedbackRepository;
use crate::application::ports::quiz_repository::{QuizAuthor, QuizRepository};
use crate::application::ports::room_publisher::RoomPublisher;
use crate::application::ports::sms_notifier::{SmsNotifier, SmsReceipt};
use crate::application::ports::timetable_repository::TimetableRepository;
use crate::application::ports::user_repository::{UserCredentials, UserRepository};
use crate::domain::admissions::admission::{Admission, AdmissionStatus, NewAdmission};
use crate::domain::announcements::announcement::{Announcement, ValidAnnouncement};
use crate::domain::contact::contact::{ContactMessage, ContactReply, ContactStatus, NewContact};
use crate::domain::diary::diary::{DiaryComment, DiaryEntry, ValidDiaryEntry};
use crate::domain::events::event::{Event, EventSpec};
use crate::domain::feedback::feedback::{Feedback, FeedbackWithStudent, NewFeedback};
use crate::domain::quizzes::quiz::{
    NewSubmission, Quiz, QuizSpec, QuizSubmission, attempt_allowed,
};
use crate::domain::realtime::change::{ChangeNotification, OutboundMessage};
use crate::domain::timetables::timetable::{TimetableDraft, TimetableEntry, sort_schedule};
use crate::domain::users::user::{Role, User, ValidNewUser, member_code};

#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<(User, String)>>,
    counters: Mutex<HashMap<Role, i64>>,
}

impl InMemoryUsers {
    pub fn get(&self, id: Uuid) -> Option<User> {
        let rows = self.rows.lock().unwrap();
        rows.iter().find(|(u, _)| u.id == id).map(|(u, _)| u.clone())
    }

    /// Seeds a user without going through registration.
    pub fn seed(&self, name: &str, role: Role, class: Option<&str>) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: name.into(),
            email: format!("{}@dps.in", name.to_lowercase().replace(' ', ".")),
            role,
            member_code: None,
            class: class.map(str::to_string),
            section: None,
            subjects: vec![],
            classes: vec![],
            phone: None,
            address: None,
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push((user.clone(), String::new()));
        user
    }

    pub fn set_classes(&self, id: Uuid, classes: &[&str]) {
        let mut rows = self.rows.lock().unwrap();
        if let Some((u, _)) = rows.iter_mut().find(|(u, _)| u.id == id) {
            u.classes = classes.iter().map(|c| c.to_string()).collect();
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn create_user(
        &self,
        user: &ValidNewUser,
        password_hash: &str,
    ) -> anyhow::Result<Option<User>> {
        if self.rows.lock().unwrap().iter().any(|(u, _)| u.email == user.email) {
            return Ok(None);
        }
        let n = {
            let mut counters = self.counters.lock().unwrap();
            let n = counters.entry(user.role).or_insert(0);
            *n += 1;
            *n
        };
        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            member_code: member_code(user.role, n),
            class: user.class.clone(),
            section: user.section.clone(),
            subjects: user.subjects.clone(),
            classes: user.classes.clone(),
            phone: user.phone.clone(),
            address: user.address.clone(),
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        self.rows
            .lock()
            .unwrap()
            .push((created.clone(), password_hash.to_string()));
        Ok(Some(created))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserCredentials>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|(u, _)| u.email == email)
            .map(|(u, h)| UserCredentials {
                user: u.clone(),
                password_hash: h.clone(),
            }))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.get(id))
    }

    async fn email_taken(&self, email: &str) -> anyhow::Result<bool> {
        Ok(self.rows.lock().unwrap().iter().any(|(u, _)| u.email == email))
    }

    async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> anyhow::Result<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some((u, _)) = rows.iter_mut().find(|(u, _)| u.id == id) {
            u.last_login = Some(at);
        }
        Ok(())
    }

    async fn list_by_role(&self, role: Role) -> anyhow::Result<Vec<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|(u, _)| u.role == role)
            .map(|(u, _)| u.clone())
            .collect())
    }

    async fn list_students_in(&self, classes: &[String]) -> anyhow::Result<Vec<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|(u, _)| {
                u.role == Role::Student && u.class.as_ref().is_some_and(|c| classes.contains(c))
            })
            .map(|(u, _)| u.clone())
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryAdmissions {
    rows: Mutex<Vec<Admission>>,
}

impl InMemoryAdmissions {
    pub fn get(&self, id: Uuid) -> Option<Admission> {
        self.rows.lock().unwrap().iter().find(|a| a.id == id).cloned()
    }
}

#[async_trait]
impl AdmissionRepository for InMemoryAdmissions {
    async fn create(&self, a: &NewAdmission) -> anyhow::Result<Admission> {
        let now = Utc::now();
        let created = Admission {
            id: Uuid::new_v4(),
            name: a.name.clone(),
            parent_number: a.parent_number.clone(),
            email: a.email.clone(),
            class: a.class.clone(),
            address: a.address.clone(),
            status: AdmissionStatus::Pending,
            approved_by: None,
            approved_at: None,
            declined_by: None,
            declined_at: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn list(&self) -> anyhow::Result<Vec<Admission>> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.reverse();
        Ok(rows)
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Admission>> {
        Ok(self.get(id))
    }

    async fn save_decision(&self, admission: &Admission) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|a| a.id == admission.id) {
            Some(row) if row.status == AdmissionStatus::Pending => {
                *row = admission.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct InMemoryQuizzes {
    quizzes: Mutex<Vec<Quiz>>,
    submissions: Mutex<Vec<QuizSubmission>>,
}

impl InMemoryQuizzes {
    pub fn insert(&self, quiz: Quiz) {
        self.quizzes.lock().unwrap().push(quiz);
    }

    pub fn get(&self, id: Uuid) -> Option<Quiz> {
        self.quizzes.lock().unwrap().iter().find(|q| q.id == id).cloned()
    }
}

#[async_trait]
impl QuizRepository for InMemoryQuizzes {
    async fn create(&self, spec: &QuizSpec, author: QuizAuthor<'_>) -> anyhow::Result<Quiz> {
        let now = Utc::now();
        let quiz = Quiz {
            id: Uuid::new_v4(),
            title: spec.title.clone(),
            description: spec.description.clone(),
            subject: spec.subject.clone(),
            class: spec.class.clone(),
            section: spec.section.clone(),
            teacher_id: author.id,
            teacher_name: Some(author.name.to_string()),
            questions: spec.questions.clone(),
            duration: spec.duration,
            passing_score: spec.passing_score,
            max_attempts: spec.max_attempts,
            is_active: spec.is_active,
            is_published: spec.is_published,
            show_results: spec.show_results,
            start_date: spec.start_date,
            end_date: spec.end_date,
            time_limit: spec.time_limit,
            created_by: author.id,
            updated_by: None,
            is_deleted: false,
            total_submissions: 0,
            average_score: 0.0,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        self.insert(quiz.clone());
        Ok(quiz)
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Quiz>> {
        let mut rows: Vec<Quiz> = self
            .quizzes
            .lock()
            .unwrap()
            .iter()
            .filter(|q| !q.is_deleted)
            .cloned()
            .collect();
        rows.reverse();
        Ok(rows)
    }

    async fn list_for_class(&self, class: &str) -> anyhow::Result<Vec<Quiz>> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .filter(|q| q.class == class)
            .collect())
    }

    async fn list_by_teacher(&self, teacher_id: Uuid) -> anyhow::Result<Vec<Quiz>> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .filter(|q| q.teacher_id == teacher_id)
            .collect())
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Quiz>> {
        Ok(self.get(id))
    }

    async fn update(&self, quiz: &Quiz) -> anyhow::Result<()> {
        let mut rows = self.quizzes.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|q| q.id == quiz.id) {
            *row = quiz.clone();
        }
        Ok(())
    }

    async fn record_submission(
        &self,
        s: &NewSubmission,
    ) -> anyhow::Result<Option<QuizSubmission>> {
        let mut subs = self.submissions.lock().unwrap();
        let mut quizzes = self.quizzes.lock().unwrap();
        let max_attempts = quizzes
            .iter()
            .find(|q| q.id == s.quiz_id)
            .map(|q| q.max_attempts)
            .ok_or_else(|| anyhow::anyhow!("quiz {} missing", s.quiz_id))?;
        let attempts = subs
            .iter()
            .filter(|x| x.quiz_id == s.quiz_id && x.student_id == s.student_id)
            .count() as i64;
        if !attempt_allowed(max_attempts, attempts) {
            return Ok(None);
        }
        let stored = QuizSubmission {
            id: Uuid::new_v4(),
            quiz_id: s.quiz_id,
            student_id: s.student_id,
            student_name: None,
            student_email: None,
            answers: s.answers.clone(),
            score: s.score.score as i32,
            total_points: s.score.total_possible as i32,
            total_questions: s.total_questions,
            percentage: s.score.percentage as i32,
            passed: s.score.passed,
            time_taken: s.time_taken,
            submitted_at: s.submitted_at,
        };
        subs.push(stored.clone());
        let for_quiz: Vec<_> = subs.iter().filter(|x| x.quiz_id == s.quiz_id).collect();
        let total = for_quiz.len() as i64;
        let average =
            for_quiz.iter().map(|x| x.percentage as f64).sum::<f64>() / total.max(1) as f64;
        if let Some(q) = quizzes.iter_mut().find(|q| q.id == s.quiz_id) {
            q.total_submissions = total;
            q.average_score = average;
        }
        Ok(Some(stored))
    }

    async fn list_submissions(&self, quiz_id: Uuid) -> anyhow::Result<Vec<QuizSubmission>> {
        Ok(self
            .submissions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.quiz_id == quiz_id)
            .cloned()
            .collect())
    }

    async fn find_submission(&self, id: Uuid) -> anyhow::Result<Option<QuizSubmission>> {
        Ok(self
            .submissions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryEvents {
    rows: Mutex<Vec<Event>>,
    registrations: Mutex<HashSet<(Uuid, Uuid)>>,
}

impl InMemoryEvents {
    pub fn insert(&self, event: Event) {
        self.rows.lock().unwrap().push(event);
    }

    pub fn get(&self, id: Uuid) -> Option<Event> {
        self.rows.lock().unwrap().iter().find(|e| e.id == id).cloned()
    }
}

#[async_trait]
impl EventRepository for InMemoryEvents {
    async fn create(&self, spec: &EventSpec, created_by: Uuid) -> anyhow::Result<Event> {
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            title: spec.title.clone(),
            description: spec.description.clone(),
            start_date: spec.start_date,
            end_date: spec.end_date,
            all_day: spec.all_day,
            location: spec.location.clone(),
            event_type: spec.event_type,
            created_by,
            created_by_name: None,
            scope: spec.scope,
            target_classes: spec.target_classes.clone(),
            target_teachers: spec.target_teachers.clone(),
            recurrence: spec.recurrence.clone(),
            attachments: spec.attachments.clone(),
            registration_required: spec.registration_required,
            registration_deadline: spec.registration_deadline,
            max_participants: spec.max_participants,
            participant_count: 0,
            is_active: spec.is_active,
            is_deleted: false,
            last_updated_by: None,
            created_at: now,
            updated_at: now,
        };
        self.insert(event.clone());
        Ok(event)
    }

    async fn list_active(&self) -> anyhow::Result<Vec<Event>> {
        let mut rows: Vec<Event> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.is_listed())
            .cloned()
            .collect();
        rows.sort_by_key(|e| e.start_date);
        Ok(rows)
    }

    async fn list_overlapping(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Event>> {
        Ok(self
            .list_active()
            .await?
            .into_iter()
            .filter(|e| e.start_date < end && start < e.end_date)
            .collect())
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Event>> {
        Ok(self.get(id))
    }

    async fn update(&self, event: &Event) -> anyhow::Result<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|e| e.id == event.id) {
            *row = event.clone();
        }
        Ok(())
    }

    async fn is_registered(&self, event_id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        Ok(self
            .registrations
            .lock()
            .unwrap()
            .contains(&(event_id, user_id)))
    }

    async fn register(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        _at: DateTime<Utc>,
    ) -> anyhow::Result<RegistrationOutcome> {
        let mut registrations = self.registrations.lock().unwrap();
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or_else(|| anyhow::anyhow!("event {event_id} missing"))?;
        let taken = registrations.iter().filter(|(e, _)| *e == event_id).count() as i64;
        if row.max_participants.is_some_and(|max| taken >= max as i64) {
            return Ok(RegistrationOutcome::Full);
        }
        if !registrations.insert((event_id, user_id)) {
            return Ok(RegistrationOutcome::AlreadyRegistered);
        }
        row.participant_count += 1;
        Ok(RegistrationOutcome::Registered)
    }
}

#[derive(Default)]
pub struct InMemoryTimetables {
    rows: Mutex<Vec<TimetableEntry>>,
}

#[async_trait]
impl TimetableRepository for InMemoryTimetables {
    async fn list_for_class(&self, class: &str) -> anyhow::Result<Vec<TimetableEntry>> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .filter(|t| t.class == class)
            .collect())
    }

    async fn list_all(&self) -> anyhow::Result<Vec<TimetableEntry>> {
        let mut rows = self.rows.lock().unwrap().clone();
        sort_schedule(&mut rows);
        Ok(rows)
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<TimetableEntry>> {
        Ok(self.rows.lock().unwrap().iter().find(|t| t.id == id).cloned())
    }

    async fn create(&self, d: &TimetableDraft) -> anyhow::Result<TimetableEntry> {
        let now = Utc::now();
        let entry = TimetableEntry {
            id: Uuid::new_v4(),
            class: d.class.clone(),
            day: d.day,
            period: d.period,
            subject: d.subject.clone(),
            teacher: d.teacher.clone(),
            room: d.room.clone(),
            start_time: d.start_time.clone(),
            end_time: d.end_time.clone(),
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(entry.clone());
        Ok(entry)
    }

    async fn update(&self, entry: &TimetableEntry) -> anyhow::Result<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|t| t.id == entry.id) {
            *row = entry.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|t| t.id != id);
        Ok(rows.len() < before)
    }
}

#[derive(Default)]
pub struct InMemoryDiary {
    rows: Mutex<Vec<DiaryEntry>>,
}

impl InMemoryDiary {
    pub fn get(&self, id: Uuid) -> Option<DiaryEntry> {
        self.rows.lock().unwrap().iter().find(|d| d.id == id).cloned()
    }
}

#[async_trait]
impl DiaryRepository for InMemoryDiary {
    async fn create(&self, student_id: Uuid, e: &ValidDiaryEntry) -> anyhow::Result<DiaryEntry> {
        let now = Utc::now();
        let entry = DiaryEntry {
            id: Uuid::new_v4(),
            student_id,
            student_name: None,
            date: e.date.unwrap_or(now),
            entry: e.entry.clone(),
            mood: e.mood.clone(),
            tags: e.tags.clone(),
            is_private: e.is_private,
            teacher_comments: vec![],
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(entry.clone());
        Ok(entry)
    }

    async fn list_for_students(&self, student_ids: &[Uuid]) -> anyhow::Result<Vec<DiaryEntry>> {
        let mut rows: Vec<DiaryEntry> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|d| student_ids.contains(&d.student_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<DiaryEntry>> {
        Ok(self.get(id))
    }

    async fn add_comment(&self, entry_id: Uuid, comment: &DiaryComment) -> anyhow::Result<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|d| d.id == entry_id) {
            row.teacher_comments.push(comment.clone());
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryContacts {
    rows: Mutex<Vec<ContactMessage>>,
}

impl InMemoryContacts {
    pub fn get(&self, id: Uuid) -> Option<ContactMessage> {
        self.rows.lock().unwrap().iter().find(|c| c.id == id).cloned()
    }
}

#[async_trait]
impl ContactRepository for InMemoryContacts {
    async fn create(&self, c: &NewContact) -> anyhow::Result<ContactMessage> {
        let now = Utc::now();
        let msg = ContactMessage {
            id: Uuid::new_v4(),
            name: c.name.clone(),
            email: c.email.clone(),
            phone: c.phone.clone(),
            subject: c.subject.clone(),
            message: c.message.clone(),
            status: ContactStatus::New,
            priority: c.priority.unwrap_or_default(),
            category: c.category.unwrap_or_default(),
            assigned_to: None,
            replies: vec![],
            resolved_at: None,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(msg.clone());
        Ok(msg)
    }

    async fn list(&self, filter: ContactFilter) -> anyhow::Result<Vec<ContactMessage>> {
        let mut rows: Vec<ContactMessage> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|c| filter.status.is_none_or(|s| c.status == s))
            .filter(|c| filter.category.is_none_or(|k| c.category == k))
            .cloned()
            .collect();
        rows.reverse();
        Ok(rows)
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<ContactMessage>> {
        Ok(self.get(id))
    }

    async fn update_status(&self, contact: &ContactMessage) -> anyhow::Result<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|c| c.id == contact.id) {
            row.status = contact.status;
            row.assigned_to = contact.assigned_to;
            row.resolved_at = contact.resolved_at;
            row.updated_at = contact.updated_at;
        }
        Ok(())
    }

    async fn add_reply(&self, contact: &ContactMessage, reply: &ContactReply) -> anyhow::Result<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|c| c.id == contact.id) {
            row.replies.push(reply.clone());
            row.status = contact.status;
            row.updated_at = contact.updated_at;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryFeedback {
    rows: Mutex<Vec<Feedback>>,
}

#[async_trait]
impl FeedbackRepository for InMemoryFeedback {
    async fn create(&self, student_id: Uuid, f: &NewFeedback) -> anyhow::Result<Feedback> {
        let fb = Feedback {
            id: Uuid::new_v4(),
            student_id,
            title: f.title.clone(),
            message: f.message.clone(),
            rating: f.rating,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(fb.clone());
        Ok(fb)
    }

    async fn list_with_students(&self) -> anyhow::Result<Vec<FeedbackWithStudent>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .rev()
            .map(|f| FeedbackWithStudent {
                feedback: f.clone(),
                student_name: None,
                student_email: None,
            })
            .collect())
    }

    async fn list_for_student(&self, student_id: Uuid) -> anyhow::Result<Vec<Feedback>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|f| f.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Feedback>> {
        Ok(self.rows.lock().unwrap().iter().find(|f| f.id == id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryAnnouncements {
    rows: Mutex<Vec<Announcement>>,
}

#[async_trait]
impl AnnouncementRepository for InMemoryAnnouncements {
    async fn create(&self, a: &ValidAnnouncement, created_by: Uuid) -> anyhow::Result<Announcement> {
        let ann = Announcement {
            id: Uuid::new_v4(),
            title: a.title.clone(),
            message: a.message.clone(),
            kind: a.kind,
            priority: a.priority,
            target_audience: a.target_audience,
            specific_classes: a.specific_classes.clone(),
            scheduled_at: a.scheduled_at,
            expires_at: a.expires_at,
            is_active: true,
            created_by,
            created_by_name: None,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(ann.clone());
        Ok(ann)
    }

    async fn list_active(&self) -> anyhow::Result<Vec<Announcement>> {
        let mut rows: Vec<Announcement> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.is_active)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
        Ok(rows)
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Announcement>> {
        Ok(self.rows.lock().unwrap().iter().find(|a| a.id == id).cloned())
    }
}

/// Replays a fixed list of notifications, then ends.
#[derive(Default)]
pub struct ScriptedFeed {
    pub notifications: Mutex<Vec<ChangeNotification>>,
}

impl ScriptedFeed {
    pub fn new(notifications: Vec<ChangeNotification>) -> Self {
        Self {
            notifications: Mutex::new(notifications),
        }
    }
}

#[async_trait]
impl ChangeFeed for ScriptedFeed {
    async fn subscribe(&self) -> anyhow::Result<BoxStream<'static, ChangeNotification>> {
        let items = std::mem::take(&mut *self.notifications.lock().unwrap());
        Ok(stream::iter(items).boxed())
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    pub sent: Mutex<Vec<OutboundMessage>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|m| m.event.clone()).collect()
    }
}

#[async_trait]
impl RoomPublisher for RecordingPublisher {
    async fn publish(&self, message: OutboundMessage) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSms {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl SmsNotifier for RecordingSms {
    async fn send(&self, to: &str, body: &str) -> anyhow::Result<SmsReceipt> {
        self.sent.lock().unwrap().push((to.into(), body.into()));
        Ok(SmsReceipt {
            sent: true,
            message: "recorded".into(),
        })
    }
}
