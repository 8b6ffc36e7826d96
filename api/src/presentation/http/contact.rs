use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::access::{ADMIN, require_role};
use crate::application::ports::contact_repository::ContactFilter;
use crate::application::use_cases::contact::contact::{
    ListContacts, ReplyToContact, SubmitContact, UpdateContactStatus,
};
use crate::bootstrap::app_context::AppContext;
use crate::domain::contact::contact::{
    ContactCategory, ContactMessage, ContactReply, ContactStatus, NewContact,
};
use crate::presentation::http::auth::CurrentUser;
use crate::presentation::http::error::{ApiJson, ApiResult};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ContactQuery {
    pub status: Option<ContactStatus>,
    pub category: Option<ContactCategory>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusRequest {
    pub status: ContactStatus,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReplyRequest {
    #[serde(default)]
    pub reply_message: String,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/contact", get(list_contacts).post(submit_contact))
        .route("/contact/:id/status", put(update_contact_status))
        .route("/contact/:id/reply", post(reply_to_contact))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/contact", tag = "Contact", request_body = NewContact, security(()), responses(
    (status = 201, body = ContactMessage),
    (status = 400, body = ErrorBody)
))]
pub async fn submit_contact(
    State(ctx): State<AppContext>,
    ApiJson(body): ApiJson<NewContact>,
) -> ApiResult<(StatusCode, Json<ContactMessage>)> {
    let repo = ctx.contact_repo();
    let uc = SubmitContact {
        repo: repo.as_ref(),
    };
    Ok((StatusCode::CREATED, Json(uc.execute(body).await?)))
}

#[utoipa::path(get, path = "/api/contact", tag = "Contact", params(ContactQuery), responses(
    (status = 200, body = [ContactMessage]),
    (status = 403, body = ErrorBody)
))]
pub async fn list_contacts(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Query(q): Query<ContactQuery>,
) -> ApiResult<Json<Vec<ContactMessage>>> {
    require_role(&user, ADMIN)?;
    let repo = ctx.contact_repo();
    let uc = ListContacts {
        repo: repo.as_ref(),
    };
    let filter = ContactFilter {
        status: q.status,
        category: q.category,
    };
    Ok(Json(uc.execute(filter).await?))
}

#[utoipa::path(put, path = "/api/contact/{id}/status", tag = "Contact",
    params(("id" = Uuid, Path, description = "Contact message ID")),
    request_body = StatusRequest,
    responses(
        (status = 200, body = ContactMessage),
        (status = 404, body = ErrorBody)
    ))]
pub async fn update_contact_status(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    ApiJson(body): ApiJson<StatusRequest>,
) -> ApiResult<Json<ContactMessage>> {
    require_role(&user, ADMIN)?;
    let repo = ctx.contact_repo();
    let uc = UpdateContactStatus {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute(id, body.status, body.assigned_to).await?))
}

#[utoipa::path(post, path = "/api/contact/{id}/reply", tag = "Contact",
    params(("id" = Uuid, Path, description = "Contact message ID")),
    request_body = ReplyRequest,
    responses(
        (status = 201, body = ContactReply),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody)
    ))]
pub async fn reply_to_contact(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    ApiJson(body): ApiJson<ReplyRequest>,
) -> ApiResult<(StatusCode, Json<ContactReply>)> {
    require_role(&user, ADMIN)?;
    let repo = ctx.contact_repo();
    let uc = ReplyToContact {
        repo: repo.as_ref(),
    };
    let reply = uc.execute(id, user.id, &body.reply_message).await?;
    Ok((StatusCode::CREATED, Json(reply)))
}
