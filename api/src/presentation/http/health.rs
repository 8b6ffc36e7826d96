use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use utoipa::ToSchema;

use crate::infrastructure::db::PgPool;
use crate::infrastructure::realtime::RoomHub;

#[derive(Clone)]
pub struct HealthState {
    pub pool: PgPool,
    pub rooms: RoomHub,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResp {
    pub status: &'static str,
    pub database: bool,
    /// Connected realtime sockets.
    pub sockets: usize,
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    security(()),
    responses((status = 200, body = HealthResp))
)]
pub async fn health(State(state): State<HealthState>) -> Json<HealthResp> {
    let database = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.pool)
        .await
        .is_ok();
    let status = if database { "ok" } else { "degraded" };
    Json(HealthResp {
        status,
        database,
        sockets: state.rooms.socket_count(),
    })
}

pub fn routes(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}
