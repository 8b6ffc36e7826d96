use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::access::{AuthUser, STUDENT, require_role};
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::diary_repository::DiaryRepository;
use crate::application::ports::event_repository::EventRepository;
use crate::application::ports::quiz_repository::QuizRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::realtime::watch_registry::WatchRegistry;
use crate::domain::diary::diary::DiaryEntry;
use crate::domain::events::event::EventView;
use crate::domain::quizzes::quiz::QuizView;
use crate::domain::realtime::change::{Collection, Room, UnknownRoom};
use crate::domain::users::user::{Role, User};

pub const MEMBER_WATCHES: &[Collection] =
    &[Collection::Quizzes, Collection::Events, Collection::Diary];

const TEACHER_RECENT_DIARY: usize = 10;
const STUDENT_RECENT_DIARY: usize = 5;

#[derive(Debug, Serialize, ToSchema)]
pub struct TeacherDashboardData {
    pub namespace: String,
    pub teacher: User,
    pub quizzes: Vec<QuizView>,
    pub published_quizzes: usize,
    pub draft_quizzes: usize,
    pub students: Vec<User>,
    pub events: Vec<EventView>,
    pub diary_entries: usize,
    pub recent_diary: Vec<DiaryEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentDashboardData {
    pub namespace: String,
    pub student: User,
    pub quizzes: Vec<QuizView>,
    pub upcoming_quizzes: usize,
    pub events: Vec<EventView>,
    pub diary_entries: usize,
    pub recent_diary: Vec<DiaryEntry>,
}

async fn load_profile<U: UserRepository + ?Sized>(users: &U, user: &AuthUser) -> ServiceResult<User> {
    match users.find_by_id(user.id).await? {
        Some(u) if u.is_active => Ok(u),
        Some(_) => Err(ServiceError::Forbidden),
        None => Err(ServiceError::NotFound("User")),
    }
}

async fn register(watches: &WatchRegistry, user: &AuthUser) -> String {
    let namespace = Room::namespace(user.role, user.id);
    watches.register(namespace.clone(), MEMBER_WATCHES).await;
    tracing::debug!(namespace = %namespace, "dashboard_namespace_registered");
    namespace.to_string()
}

pub struct TeacherDashboard<'a, U, Q, E, D>
where
    U: UserRepository + ?Sized,
    Q: QuizRepository + ?Sized,
    E: EventRepository + ?Sized,
    D: DiaryRepository + ?Sized,
{
    pub users: &'a U,
    pub quizzes: &'a Q,
    pub events: &'a E,
    pub diary: &'a D,
    pub watches: &'a WatchRegistry,
}

impl<'a, U, Q, E, D> TeacherDashboard<'a, U, Q, E, D>
where
    U: UserRepository + ?Sized,
    Q: QuizRepository + ?Sized,
    E: EventRepository + ?Sized,
    D: DiaryRepository + ?Sized,
{
    /// Admins may open it too; they see it as a teacher with no classes.
    pub async fn execute(&self, user: &AuthUser) -> ServiceResult<TeacherDashboardData> {
        if !user.is_staff() {
            return Err(ServiceError::Forbidden);
        }
        let now = Utc::now();
        let teacher = load_profile(self.users, user).await?;
        let viewer = teacher.viewer();

        let quizzes: Vec<QuizView> = self
            .quizzes
            .list_by_teacher(teacher.id)
            .await?
            .iter()
            .map(|q| q.view(now))
            .collect();
        let published_quizzes = quizzes.iter().filter(|v| v.quiz.is_published).count();

        let students = if teacher.classes.is_empty() {
            Vec::new()
        } else {
            self.users.list_students_in(&teacher.classes).await?
        };
        let ids: Vec<_> = students.iter().map(|s| s.id).collect();
        let diary = if ids.is_empty() {
            Vec::new()
        } else {
            self.diary.list_for_students(&ids).await?
        };

        let events = self
            .events
            .list_active()
            .await?
            .iter()
            .filter(|e| e.visible_to(&viewer))
            .map(|e| e.view(now))
            .collect();

        Ok(TeacherDashboardData {
            namespace: register(self.watches, user).await,
            draft_quizzes: quizzes.len() - published_quizzes,
            published_quizzes,
            quizzes,
            students,
            events,
            diary_entries: diary.len(),
            recent_diary: diary.into_iter().take(TEACHER_RECENT_DIARY).collect(),
            teacher,
        })
    }
}

pub struct StudentDashboard<'a, U, Q, E, D>
where
    U: UserRepository + ?Sized,
    Q: QuizRepository + ?Sized,
    E: EventRepository + ?Sized,
    D: DiaryRepository + ?Sized,
{
    pub users: &'a U,
    pub quizzes: &'a Q,
    pub events: &'a E,
    pub diary: &'a D,
    pub watches: &'a WatchRegistry,
}

impl<'a, U, Q, E, D> StudentDashboard<'a, U, Q, E, D>
where
    U: UserRepository + ?Sized,
    Q: QuizRepository + ?Sized,
    E: EventRepository + ?Sized,
    D: DiaryRepository + ?Sized,
{
    pub async fn execute(&self, user: &AuthUser) -> ServiceResult<StudentDashboardData> {
        require_role(user, STUDENT)?;
        let now = Utc::now();
        let student = load_profile(self.users, user).await?;
        let viewer = student.viewer();

        let class_quizzes = match student.class.as_deref() {
            Some(class) => self.quizzes.list_for_class(class).await?,
            None => Vec::new(),
        };
        let upcoming_quizzes = class_quizzes.iter().filter(|q| q.is_upcoming(now)).count();
        let quizzes = class_quizzes
            .iter()
            .filter(|q| q.availability(now).is_ok())
            .map(|q| q.student_view(now))
            .collect();

        let events = self
            .events
            .list_active()
            .await?
            .iter()
            .filter(|e| e.visible_to(&viewer))
            .map(|e| e.view(now))
            .collect();
        let diary = self.diary.list_for_students(&[student.id]).await?;

        Ok(StudentDashboardData {
            namespace: register(self.watches, user).await,
            quizzes,
            upcoming_quizzes,
            events,
            diary_entries: diary.len(),
            recent_diary: diary.into_iter().take(STUDENT_RECENT_DIARY).collect(),
            student,
        })
    }
}

/// Drops a dashboard namespace. Callers may only drop their own.
pub struct Disconnect<'a> {
    pub watches: &'a WatchRegistry,
}

impl<'a> Disconnect<'a> {
    pub async fn execute(&self, user: &AuthUser, namespace: &str) -> ServiceResult<bool> {
        let room: Room = namespace
            .parse()
            .map_err(|e: UnknownRoom| ServiceError::BadRequest(e.to_string()))?;
        match &room {
            Room::Namespace { role, user_id } if *role == user.role && *user_id == user.id => {}
            Room::Namespace { .. } => return Err(ServiceError::Forbidden),
            _ => {
                return Err(ServiceError::BadRequest(
                    "Only dashboard namespaces can be disconnected".into(),
                ));
            }
        }
        let removed = self.watches.unregister(&room).await;
        tracing::debug!(namespace = %room, removed, "dashboard_namespace_unregistered");
        Ok(removed)
    }
}
