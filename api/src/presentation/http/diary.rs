use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::access::{STAFF, STUDENT, require_role};
use crate::application::use_cases::diary::diary::{CommentOnDiary, CreateDiaryEntry, ListDiary};
use crate::bootstrap::app_context::AppContext;
use crate::domain::diary::diary::{DiaryComment, DiaryEntry, NewDiaryEntry};
use crate::presentation::http::auth::CurrentUser;
use crate::presentation::http::error::{ApiJson, ApiResult};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CommentRequest {
    #[serde(default)]
    pub comment: String,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/diary", get(my_diary).post(create_diary_entry))
        .route("/diary/student/:id", get(student_diary))
        .route("/diary/:id/comment", post(comment_on_diary))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/diary", tag = "Diary", request_body = NewDiaryEntry, responses(
    (status = 201, body = DiaryEntry),
    (status = 400, body = ErrorBody),
    (status = 403, body = ErrorBody)
))]
pub async fn create_diary_entry(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<NewDiaryEntry>,
) -> ApiResult<(StatusCode, Json<DiaryEntry>)> {
    require_role(&user, STUDENT)?;
    let repo = ctx.diary_repo();
    let uc = CreateDiaryEntry {
        repo: repo.as_ref(),
    };
    Ok((StatusCode::CREATED, Json(uc.execute(user.id, body).await?)))
}

#[utoipa::path(get, path = "/api/diary", tag = "Diary", responses(
    (status = 200, body = [DiaryEntry]),
    (status = 403, body = ErrorBody)
))]
pub async fn my_diary(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<DiaryEntry>>> {
    require_role(&user, STUDENT)?;
    let repo = ctx.diary_repo();
    let users = ctx.user_repo();
    let uc = ListDiary {
        repo: repo.as_ref(),
        users: users.as_ref(),
    };
    Ok(Json(uc.mine(user.id).await?))
}

#[utoipa::path(get, path = "/api/diary/student/{id}", tag = "Diary",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, body = [DiaryEntry]),
        (status = 403, body = ErrorBody),
        (status = 404, body = ErrorBody)
    ))]
pub async fn student_diary(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(student_id): Path<Uuid>,
) -> ApiResult<Json<Vec<DiaryEntry>>> {
    require_role(&user, STAFF)?;
    let repo = ctx.diary_repo();
    let users = ctx.user_repo();
    let uc = ListDiary {
        repo: repo.as_ref(),
        users: users.as_ref(),
    };
    Ok(Json(uc.for_student(student_id).await?))
}

#[utoipa::path(post, path = "/api/diary/{id}/comment", tag = "Diary",
    params(("id" = Uuid, Path, description = "Diary entry ID")),
    request_body = CommentRequest,
    responses(
        (status = 201, body = DiaryComment),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody)
    ))]
pub async fn comment_on_diary(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    ApiJson(body): ApiJson<CommentRequest>,
) -> ApiResult<(StatusCode, Json<DiaryComment>)> {
    require_role(&user, STAFF)?;
    let repo = ctx.diary_repo();
    let uc = CommentOnDiary {
        repo: repo.as_ref(),
    };
    let comment = uc.execute(&user, id, &body.comment).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
