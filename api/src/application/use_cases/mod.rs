pub mod admissions;
pub mod announcements;
pub mod auth;
pub mod contact;
pub mod dashboards;
pub mod diary;
pub mod events;
pub mod feedback;
pub mod quizzes;
pub mod timetables;
