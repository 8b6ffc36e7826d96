pub mod change_feed_pg;
pub mod room_hub;

pub use change_feed_pg::PgChangeFeed;
pub use room_hub::RoomHub;
