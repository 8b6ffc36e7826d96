use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::application::access::{STAFF, STUDENT, require_role};
use crate::application::use_cases::feedback::feedback::{CreateFeedback, ListFeedback};
use crate::bootstrap::app_context::AppContext;
use crate::domain::feedback::feedback::{Feedback, FeedbackWithStudent, NewFeedback};
use crate::presentation::http::auth::CurrentUser;
use crate::presentation::http::error::{ApiJson, ApiResult};

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/feedback", get(list_feedback).post(create_feedback))
        .route("/feedback/mine", get(my_feedback))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/feedback", tag = "Feedback", request_body = NewFeedback, responses(
    (status = 201, body = Feedback),
    (status = 400, body = ErrorBody),
    (status = 403, body = ErrorBody)
))]
pub async fn create_feedback(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<NewFeedback>,
) -> ApiResult<(StatusCode, Json<Feedback>)> {
    require_role(&user, STUDENT)?;
    let repo = ctx.feedback_repo();
    let uc = CreateFeedback {
        repo: repo.as_ref(),
    };
    Ok((StatusCode::CREATED, Json(uc.execute(user.id, body).await?)))
}

#[utoipa::path(get, path = "/api/feedback", tag = "Feedback", responses(
    (status = 200, body = [FeedbackWithStudent]),
    (status = 403, body = ErrorBody)
))]
pub async fn list_feedback(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<FeedbackWithStudent>>> {
    require_role(&user, STAFF)?;
    let repo = ctx.feedback_repo();
    let uc = ListFeedback {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.all().await?))
}

#[utoipa::path(get, path = "/api/feedback/mine", tag = "Feedback", responses(
    (status = 200, body = [Feedback]),
    (status = 403, body = ErrorBody)
))]
pub async fn my_feedback(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Feedback>>> {
    require_role(&user, STUDENT)?;
    let repo = ctx.feedback_repo();
    let uc = ListFeedback {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.mine(user.id).await?))
}
