pub mod admissions;
pub mod announcements;
pub mod contact;
pub mod diary;
pub mod events;
pub mod feedback;
pub mod quizzes;
pub mod realtime;
pub mod timetables;
pub mod users;
pub mod validation;
