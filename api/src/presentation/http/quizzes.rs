use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use uuid::Uuid;

use crate::application::access::{STAFF, STUDENT, require_role};
use crate::application::use_cases::quizzes::create_quiz::{CreateQuiz, CreateQuizRequest};
use crate::application::use_cases::quizzes::list_quizzes::{GetQuiz, ListClassQuizzes, ListQuizzes};
use crate::application::use_cases::quizzes::list_submissions::ListSubmissions;
use crate::application::use_cases::quizzes::submit_quiz::{
    SubmissionReceipt, SubmitQuiz, SubmitQuizRequest,
};
use crate::application::use_cases::quizzes::update_quiz::{DeleteQuiz, UpdateQuiz};
use crate::bootstrap::app_context::AppContext;
use crate::domain::quizzes::quiz::{QuizPatch, QuizSubmission, QuizView};
use crate::presentation::http::auth::CurrentUser;
use crate::presentation::http::error::{ApiJson, ApiResult};

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/quizzes", get(list_quizzes).post(create_quiz))
        .route("/quizzes/class/:class", get(list_class_quizzes))
        .route(
            "/quizzes/:id",
            get(get_quiz).put(update_quiz).delete(delete_quiz),
        )
        .route("/quizzes/:id/submit", post(submit_quiz))
        .route("/quizzes/:id/submissions", get(list_submissions))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/quizzes", tag = "Quizzes", responses(
    (status = 200, body = [QuizView]),
    (status = 403, body = ErrorBody)
))]
pub async fn list_quizzes(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<QuizView>>> {
    require_role(&user, STAFF)?;
    let repo = ctx.quiz_repo();
    let uc = ListQuizzes {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute().await?))
}

#[utoipa::path(post, path = "/api/quizzes", tag = "Quizzes", request_body = CreateQuizRequest, responses(
    (status = 201, body = QuizView),
    (status = 400, body = ErrorBody),
    (status = 403, body = ErrorBody)
))]
pub async fn create_quiz(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<CreateQuizRequest>,
) -> ApiResult<(StatusCode, Json<QuizView>)> {
    require_role(&user, STAFF)?;
    let repo = ctx.quiz_repo();
    let uc = CreateQuiz {
        repo: repo.as_ref(),
    };
    let quiz = uc.execute(&user, req).await?;
    Ok((StatusCode::CREATED, Json(quiz.view(Utc::now()))))
}

#[utoipa::path(get, path = "/api/quizzes/class/{class}", tag = "Quizzes",
    params(("class" = String, Path, description = "Class name")),
    responses(
        (status = 200, body = [QuizView]),
        (status = 403, body = ErrorBody)
    ))]
pub async fn list_class_quizzes(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(class): Path<String>,
) -> ApiResult<Json<Vec<QuizView>>> {
    let repo = ctx.quiz_repo();
    let users = ctx.user_repo();
    let uc = ListClassQuizzes {
        repo: repo.as_ref(),
        users: users.as_ref(),
    };
    Ok(Json(uc.execute(&user, &class).await?))
}

#[utoipa::path(get, path = "/api/quizzes/{id}", tag = "Quizzes",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    responses(
        (status = 200, body = QuizView),
        (status = 404, body = ErrorBody)
    ))]
pub async fn get_quiz(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<QuizView>> {
    let repo = ctx.quiz_repo();
    let users = ctx.user_repo();
    let uc = GetQuiz {
        repo: repo.as_ref(),
        users: users.as_ref(),
    };
    Ok(Json(uc.execute(&user, id).await?))
}

#[utoipa::path(put, path = "/api/quizzes/{id}", tag = "Quizzes",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    request_body = QuizPatch,
    responses(
        (status = 200, body = QuizView),
        (status = 403, body = ErrorBody),
        (status = 404, body = ErrorBody)
    ))]
pub async fn update_quiz(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    ApiJson(patch): ApiJson<QuizPatch>,
) -> ApiResult<Json<QuizView>> {
    require_role(&user, STAFF)?;
    let repo = ctx.quiz_repo();
    let uc = UpdateQuiz {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute(&user, id, patch).await?))
}

#[utoipa::path(delete, path = "/api/quizzes/{id}", tag = "Quizzes",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    responses(
        (status = 204),
        (status = 403, body = ErrorBody),
        (status = 404, body = ErrorBody)
    ))]
pub async fn delete_quiz(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_role(&user, STAFF)?;
    let repo = ctx.quiz_repo();
    let uc = DeleteQuiz {
        repo: repo.as_ref(),
    };
    uc.execute(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(post, path = "/api/quizzes/{id}/submit", tag = "Quizzes",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    request_body = SubmitQuizRequest,
    responses(
        (status = 200, body = SubmissionReceipt),
        (status = 400, body = ErrorBody),
        (status = 403, body = ErrorBody),
        (status = 409, body = ErrorBody)
    ))]
pub async fn submit_quiz(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<SubmitQuizRequest>,
) -> ApiResult<Json<SubmissionReceipt>> {
    require_role(&user, STUDENT)?;
    let repo = ctx.quiz_repo();
    let users = ctx.user_repo();
    let uc = SubmitQuiz {
        repo: repo.as_ref(),
        users: users.as_ref(),
    };
    Ok(Json(uc.execute(&user, id, req).await?))
}

#[utoipa::path(get, path = "/api/quizzes/{id}/submissions", tag = "Quizzes",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    responses(
        (status = 200, body = [QuizSubmission]),
        (status = 403, body = ErrorBody),
        (status = 404, body = ErrorBody)
    ))]
pub async fn list_submissions(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<QuizSubmission>>> {
    require_role(&user, STAFF)?;
    let repo = ctx.quiz_repo();
    let uc = ListSubmissions {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute(&user, id).await?))
}
