use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::access::{STAFF, STUDENT, require_role};
use crate::application::use_cases::events::list_events::ListEvents;
use crate::application::use_cases::events::manage_event::{
    CreateEvent, CreateEventRequest, DeleteEvent, UpdateEvent, UpdateEventRequest,
};
use crate::application::use_cases::events::register_event::RegisterForEvent;
use crate::bootstrap::app_context::AppContext;
use crate::domain::events::event::EventView;
use crate::presentation::http::auth::CurrentUser;
use crate::presentation::http::error::{ApiJson, ApiResult};

const DEFAULT_UPCOMING: usize = 10;
const MAX_UPCOMING: usize = 50;

#[derive(Debug, Deserialize, IntoParams)]
pub struct UpcomingQuery {
    /// How many events to return (default 10, at most 50).
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegistrationResponse {
    pub message: String,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/upcoming", get(upcoming_events))
        .route("/events/:id", put(update_event).delete(delete_event))
        .route("/events/:id/register", post(register_for_event))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/events", tag = "Events", responses(
    (status = 200, body = [EventView])
))]
pub async fn list_events(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<EventView>>> {
    let repo = ctx.event_repo();
    let users = ctx.user_repo();
    let uc = ListEvents {
        repo: repo.as_ref(),
        users: users.as_ref(),
    };
    Ok(Json(uc.execute(&user).await?))
}

#[utoipa::path(get, path = "/api/events/upcoming", tag = "Events", params(UpcomingQuery), responses(
    (status = 200, body = [EventView])
))]
pub async fn upcoming_events(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Query(q): Query<UpcomingQuery>,
) -> ApiResult<Json<Vec<EventView>>> {
    let limit = q.limit.unwrap_or(DEFAULT_UPCOMING).clamp(1, MAX_UPCOMING);
    let repo = ctx.event_repo();
    let users = ctx.user_repo();
    let uc = ListEvents {
        repo: repo.as_ref(),
        users: users.as_ref(),
    };
    Ok(Json(uc.upcoming(&user, limit).await?))
}

#[utoipa::path(post, path = "/api/events", tag = "Events", request_body = CreateEventRequest, responses(
    (status = 201, body = EventView),
    (status = 400, body = ErrorBody),
    (status = 403, body = ErrorBody),
    (status = 409, body = ErrorBody)
))]
pub async fn create_event(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<CreateEventRequest>,
) -> ApiResult<(StatusCode, Json<EventView>)> {
    require_role(&user, STAFF)?;
    let repo = ctx.event_repo();
    let uc = CreateEvent {
        repo: repo.as_ref(),
    };
    let event = uc.execute(&user, req).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

#[utoipa::path(put, path = "/api/events/{id}", tag = "Events",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, body = EventView),
        (status = 403, body = ErrorBody),
        (status = 404, body = ErrorBody),
        (status = 409, body = ErrorBody)
    ))]
pub async fn update_event(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<UpdateEventRequest>,
) -> ApiResult<Json<EventView>> {
    require_role(&user, STAFF)?;
    let repo = ctx.event_repo();
    let uc = UpdateEvent {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute(&user, id, req).await?))
}

#[utoipa::path(delete, path = "/api/events/{id}", tag = "Events",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 204),
        (status = 403, body = ErrorBody),
        (status = 404, body = ErrorBody)
    ))]
pub async fn delete_event(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_role(&user, STAFF)?;
    let repo = ctx.event_repo();
    let uc = DeleteEvent {
        repo: repo.as_ref(),
    };
    uc.execute(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(post, path = "/api/events/{id}/register", tag = "Events",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, body = RegistrationResponse),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody),
        (status = 409, body = ErrorBody)
    ))]
pub async fn register_for_event(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RegistrationResponse>> {
    require_role(&user, STUDENT)?;
    let repo = ctx.event_repo();
    let users = ctx.user_repo();
    let uc = RegisterForEvent {
        repo: repo.as_ref(),
        users: users.as_ref(),
    };
    uc.execute(&user, id).await?;
    Ok(Json(RegistrationResponse {
        message: "Registered for event".into(),
    }))
}
