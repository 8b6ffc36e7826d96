use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

use crate::application::access::{STAFF, require_role};
use crate::application::use_cases::announcements::announcements::{
    CreateAnnouncement, ListAnnouncements,
};
use crate::bootstrap::app_context::AppContext;
use crate::domain::announcements::announcement::{Announcement, NewAnnouncement};
use crate::presentation::http::auth::CurrentUser;
use crate::presentation::http::error::{ApiJson, ApiResult};

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route(
            "/announcements",
            get(list_announcements).post(create_announcement),
        )
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/announcements", tag = "Announcements", request_body = NewAnnouncement, responses(
    (status = 201, body = Announcement),
    (status = 400, body = ErrorBody),
    (status = 403, body = ErrorBody)
))]
pub async fn create_announcement(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<NewAnnouncement>,
) -> ApiResult<(StatusCode, Json<Announcement>)> {
    require_role(&user, STAFF)?;
    let repo = ctx.announcement_repo();
    let uc = CreateAnnouncement {
        repo: repo.as_ref(),
    };
    Ok((StatusCode::CREATED, Json(uc.execute(&user, body).await?)))
}

/// Announcements the caller may see right now, newest first.
#[utoipa::path(get, path = "/api/announcements", tag = "Announcements", responses(
    (status = 200, body = [Announcement])
))]
pub async fn list_announcements(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Announcement>>> {
    let repo = ctx.announcement_repo();
    let users = ctx.user_repo();
    let uc = ListAnnouncements {
        repo: repo.as_ref(),
        users: users.as_ref(),
    };
    Ok(Json(uc.execute(&user).await?))
}
