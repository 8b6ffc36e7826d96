pub mod change_relay;
pub mod watch_registry;
