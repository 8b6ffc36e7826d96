pub mod list_events;
pub mod manage_event;
pub mod register_event;
