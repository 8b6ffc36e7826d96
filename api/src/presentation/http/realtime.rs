use axum::{Json, Router, extract::State, routing::{get, post}};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::use_cases::dashboards::admin_dashboard::{
    AdminDashboard, AdminDashboardData,
};
use crate::application::use_cases::dashboards::member_dashboards::{
    Disconnect, StudentDashboard, StudentDashboardData, TeacherDashboard, TeacherDashboardData,
};
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth::CurrentUser;
use crate::presentation::http::error::{ApiJson, ApiResult};

/// Dashboard snapshot plus the namespace room that carries its live updates.
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    AdminDashboardResponse = DashboardResponse<AdminDashboardData>,
    TeacherDashboardResponse = DashboardResponse<TeacherDashboardData>,
    StudentDashboardResponse = DashboardResponse<StudentDashboardData>
)]
pub struct DashboardResponse<T> {
    pub success: bool,
    pub namespace: String,
    pub data: T,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DisconnectRequest {
    pub namespace: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DisconnectResponse {
    pub success: bool,
    /// False when the namespace was not registered.
    pub removed: bool,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/realtime/admin/dashboard", get(admin_dashboard))
        .route("/realtime/teacher/dashboard", get(teacher_dashboard))
        .route("/realtime/student/dashboard", get(student_dashboard))
        .route("/realtime/disconnect", post(disconnect))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/realtime/admin/dashboard", tag = "Realtime", responses(
    (status = 200, body = AdminDashboardResponse),
    (status = 403, body = ErrorBody)
))]
pub async fn admin_dashboard(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<DashboardResponse<AdminDashboardData>>> {
    let (users, admissions, events, contacts, watches) = (
        ctx.user_repo(),
        ctx.admission_repo(),
        ctx.event_repo(),
        ctx.contact_repo(),
        ctx.watches(),
    );
    let uc = AdminDashboard {
        users: users.as_ref(),
        admissions: admissions.as_ref(),
        events: events.as_ref(),
        contacts: contacts.as_ref(),
        watches: watches.as_ref(),
    };
    let data = uc.execute(&user).await?;
    Ok(Json(DashboardResponse {
        success: true,
        namespace: data.namespace.clone(),
        data,
    }))
}

#[utoipa::path(get, path = "/api/realtime/teacher/dashboard", tag = "Realtime", responses(
    (status = 200, body = TeacherDashboardResponse),
    (status = 403, body = ErrorBody)
))]
pub async fn teacher_dashboard(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<DashboardResponse<TeacherDashboardData>>> {
    let (users, quizzes, events, diary, watches) = (
        ctx.user_repo(),
        ctx.quiz_repo(),
        ctx.event_repo(),
        ctx.diary_repo(),
        ctx.watches(),
    );
    let uc = TeacherDashboard {
        users: users.as_ref(),
        quizzes: quizzes.as_ref(),
        events: events.as_ref(),
        diary: diary.as_ref(),
        watches: watches.as_ref(),
    };
    let data = uc.execute(&user).await?;
    Ok(Json(DashboardResponse {
        success: true,
        namespace: data.namespace.clone(),
        data,
    }))
}

#[utoipa::path(get, path = "/api/realtime/student/dashboard", tag = "Realtime", responses(
    (status = 200, body = StudentDashboardResponse),
    (status = 403, body = ErrorBody)
))]
pub async fn student_dashboard(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<DashboardResponse<StudentDashboardData>>> {
    let (users, quizzes, events, diary, watches) = (
        ctx.user_repo(),
        ctx.quiz_repo(),
        ctx.event_repo(),
        ctx.diary_repo(),
        ctx.watches(),
    );
    let uc = StudentDashboard {
        users: users.as_ref(),
        quizzes: quizzes.as_ref(),
        events: events.as_ref(),
        diary: diary.as_ref(),
        watches: watches.as_ref(),
    };
    let data = uc.execute(&user).await?;
    Ok(Json(DashboardResponse {
        success: true,
        namespace: data.namespace.clone(),
        data,
    }))
}

#[utoipa::path(post, path = "/api/realtime/disconnect", tag = "Realtime", request_body = DisconnectRequest, responses(
    (status = 200, body = DisconnectResponse),
    (status = 400, body = ErrorBody),
    (status = 403, body = ErrorBody)
))]
pub async fn disconnect(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<DisconnectRequest>,
) -> ApiResult<Json<DisconnectResponse>> {
    let watches = ctx.watches();
    let uc = Disconnect {
        watches: watches.as_ref(),
    };
    let removed = uc.execute(&user, &body.namespace).await?;
    Ok(Json(DisconnectResponse {
        success: true,
        removed,
    }))
}
