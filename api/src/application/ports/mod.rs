pub mod admission_repository;
pub mod announcement_repository;
pub mod change_feed;
pub mod contact_repository;
pub mod diary_repository;
pub mod event_repository;
pub mod feedback_repository;
pub mod quiz_repository;
pub mod room_publisher;
pub mod sms_notifier;
pub mod timetable_repository;
pub mod user_repository;
