pub mod db;
pub mod notifications;
pub mod realtime;
