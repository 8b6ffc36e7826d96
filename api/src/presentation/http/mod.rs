pub mod admissions;
pub mod announcements;
pub mod auth;
pub mod contact;
pub mod diary;
pub mod error;
pub mod events;
pub mod feedback;
pub mod health;
pub mod quizzes;
pub mod realtime;
pub mod timetable;
