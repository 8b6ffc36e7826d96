use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use uuid::Uuid;

use crate::application::access::{STAFF, require_role};
use crate::application::use_cases::timetables::timetable::{
    CreateTimetableEntry, DeleteTimetableEntry, ListTimetable, UpdateTimetableEntry,
};
use crate::bootstrap::app_context::AppContext;
use crate::domain::timetables::timetable::{TimetableDraft, TimetableEntry, TimetablePatch};
use crate::presentation::http::auth::CurrentUser;
use crate::presentation::http::error::{ApiJson, ApiResult};

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/timetable", get(list_timetable).post(create_timetable_entry))
        .route("/timetable/class/:class", get(class_timetable))
        .route(
            "/timetable/:id",
            put(update_timetable_entry).delete(delete_timetable_entry),
        )
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/timetable", tag = "Timetable", responses(
    (status = 200, body = [TimetableEntry]),
    (status = 403, body = ErrorBody)
))]
pub async fn list_timetable(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<TimetableEntry>>> {
    require_role(&user, STAFF)?;
    let repo = ctx.timetable_repo();
    let uc = ListTimetable {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.all().await?))
}

#[utoipa::path(get, path = "/api/timetable/class/{class}", tag = "Timetable",
    params(("class" = String, Path, description = "Class name")),
    responses((status = 200, body = [TimetableEntry])))]
pub async fn class_timetable(
    State(ctx): State<AppContext>,
    CurrentUser(_user): CurrentUser,
    Path(class): Path<String>,
) -> ApiResult<Json<Vec<TimetableEntry>>> {
    let repo = ctx.timetable_repo();
    let uc = ListTimetable {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.for_class(&class).await?))
}

#[utoipa::path(post, path = "/api/timetable", tag = "Timetable", request_body = TimetableDraft, responses(
    (status = 201, body = TimetableEntry),
    (status = 400, body = ErrorBody),
    (status = 403, body = ErrorBody)
))]
pub async fn create_timetable_entry(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    ApiJson(draft): ApiJson<TimetableDraft>,
) -> ApiResult<(StatusCode, Json<TimetableEntry>)> {
    require_role(&user, STAFF)?;
    let repo = ctx.timetable_repo();
    let uc = CreateTimetableEntry {
        repo: repo.as_ref(),
    };
    Ok((StatusCode::CREATED, Json(uc.execute(draft).await?)))
}

#[utoipa::path(put, path = "/api/timetable/{id}", tag = "Timetable",
    params(("id" = Uuid, Path, description = "Timetable entry ID")),
    request_body = TimetablePatch,
    responses(
        (status = 200, body = TimetableEntry),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody)
    ))]
pub async fn update_timetable_entry(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    ApiJson(patch): ApiJson<TimetablePatch>,
) -> ApiResult<Json<TimetableEntry>> {
    require_role(&user, STAFF)?;
    let repo = ctx.timetable_repo();
    let uc = UpdateTimetableEntry {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute(id, patch).await?))
}

#[utoipa::path(delete, path = "/api/timetable/{id}", tag = "Timetable",
    params(("id" = Uuid, Path, description = "Timetable entry ID")),
    responses(
        (status = 204),
        (status = 404, body = ErrorBody)
    ))]
pub async fn delete_timetable_entry(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_role(&user, STAFF)?;
    let repo = ctx.timetable_repo();
    let uc = DeleteTimetableEntry {
        repo: repo.as_ref(),
    };
    uc.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
