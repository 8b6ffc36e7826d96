pub mod admission_repository_sqlx;
pub mod announcement_repository_sqlx;
pub mod contact_repository_sqlx;
pub mod diary_repository_sqlx;
pub mod event_repository_sqlx;
pub mod feedback_repository_sqlx;
pub mod quiz_repository_sqlx;
pub mod timetable_repository_sqlx;
pub mod user_repository_sqlx;
