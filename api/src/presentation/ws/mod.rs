pub mod ws;

pub use ws::{__path_axum_ws_entry, axum_ws_entry};
