use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::access::{ADMIN, STAFF, require_role};
use crate::application::use_cases::admissions::decide_admission::DecideAdmission;
use crate::application::use_cases::admissions::submit_admission::{
    ListAdmissions, SubmitAdmission,
};
use crate::bootstrap::app_context::AppContext;
use crate::domain::admissions::admission::{Admission, AdmissionDecision, NewAdmission};
use crate::presentation::http::auth::CurrentUser;
use crate::presentation::http::error::{ApiJson, ApiResult};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdmissionRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent_number: String,
    #[serde(default)]
    pub email: String,
    /// Class applied for.
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdmissionCreated {
    pub id: Uuid,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DecisionRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DecisionResponse {
    pub message: String,
    pub admission: Admission,
    pub sms_sent: bool,
    pub sms_message: String,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/admissions", get(list_admissions).post(submit_admission))
        .route("/admissions/:id/approve", put(approve_admission))
        .route("/admissions/:id/decline", put(decline_admission))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/admissions", tag = "Admissions", request_body = AdmissionRequest, security(()), responses(
    (status = 200, body = AdmissionCreated),
    (status = 400, body = ErrorBody)
))]
pub async fn submit_admission(
    State(ctx): State<AppContext>,
    ApiJson(req): ApiJson<AdmissionRequest>,
) -> ApiResult<Json<AdmissionCreated>> {
    let repo = ctx.admission_repo();
    let uc = SubmitAdmission {
        repo: repo.as_ref(),
    };
    let created = uc
        .execute(NewAdmission {
            name: req.name,
            parent_number: req.parent_number,
            email: req.email,
            class: req.class,
            address: req.address,
        })
        .await?;
    Ok(Json(AdmissionCreated { id: created.id }))
}

#[utoipa::path(get, path = "/api/admissions", tag = "Admissions", responses(
    (status = 200, body = [Admission]),
    (status = 403, body = ErrorBody)
))]
pub async fn list_admissions(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Admission>>> {
    require_role(&user, STAFF)?;
    let repo = ctx.admission_repo();
    let uc = ListAdmissions {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute().await?))
}

async fn decide(
    ctx: AppContext,
    user_id: Uuid,
    id: Uuid,
    decision: AdmissionDecision,
    notes: Option<String>,
) -> ApiResult<Json<DecisionResponse>> {
    let repo = ctx.admission_repo();
    let sms = ctx.sms();
    let uc = DecideAdmission {
        repo: repo.as_ref(),
        sms: sms.as_ref(),
        school_name: &ctx.cfg.school_name,
    };
    let outcome = uc.execute(id, decision, user_id, notes).await?;
    let message = match decision {
        AdmissionDecision::Approve => "Admission approved successfully",
        AdmissionDecision::Decline => "Admission declined",
    };
    Ok(Json(DecisionResponse {
        message: message.into(),
        admission: outcome.admission,
        sms_sent: outcome.sms.sent,
        sms_message: outcome.sms.message,
    }))
}

#[utoipa::path(put, path = "/api/admissions/{id}/approve", tag = "Admissions",
    params(("id" = Uuid, Path, description = "Admission ID")),
    request_body(content = Option<DecisionRequest>),
    responses(
        (status = 200, body = DecisionResponse),
        (status = 404, body = ErrorBody),
        (status = 409, body = ErrorBody)
    ))]
pub async fn approve_admission(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    body: Option<ApiJson<DecisionRequest>>,
) -> ApiResult<Json<DecisionResponse>> {
    require_role(&user, ADMIN)?;
    let notes = body.and_then(|ApiJson(b)| b.notes);
    decide(ctx, user.id, id, AdmissionDecision::Approve, notes).await
}

#[utoipa::path(put, path = "/api/admissions/{id}/decline", tag = "Admissions",
    params(("id" = Uuid, Path, description = "Admission ID")),
    request_body(content = Option<DecisionRequest>),
    responses(
        (status = 200, body = DecisionResponse),
        (status = 404, body = ErrorBody),
        (status = 409, body = ErrorBody)
    ))]
pub async fn decline_admission(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    body: Option<ApiJson<DecisionRequest>>,
) -> ApiResult<Json<DecisionResponse>> {
    require_role(&user, ADMIN)?;
    let notes = body.and_then(|ApiJson(b)| b.notes);
    decide(ctx, user.id, id, AdmissionDecision::Decline, notes).await
}
