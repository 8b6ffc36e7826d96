use axum::{
    Json, Router,
    extract::{FromRequestParts, State},
    http::{HeaderMap, HeaderValue, StatusCode, header, request::Parts},
    routing::{get, post},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::access::AuthUser;
use crate::application::use_cases::auth::login::{Login as LoginUc, LoginRequest as LoginDto};
use crate::application::use_cases::auth::me::GetMe;
use crate::application::use_cases::auth::register::{
    Register as RegisterUc, RegisterRequest as RegisterDto,
};
use crate::bootstrap::app_context::AppContext;
use crate::bootstrap::config::Config;
use crate::domain::users::user::{Role, User};
use crate::presentation::http::error::{ApiError, ApiJson, ApiResult};

pub const ACCESS_COOKIE: &str = "access_token";

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
    pub class: Option<String>,
    pub section: Option<String>,
    #[serde(default)]
    pub subjects: Vec<String>,
    /// Classes a teacher takes.
    #[serde(default)]
    pub classes: Vec<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub exp: usize,
}

impl Claims {
    fn for_user(user: &User, expires_secs: i64) -> Self {
        let now = chrono::Utc::now().timestamp().max(0) as usize;
        Claims {
            sub: user.id.to_string(),
            role: user.role,
            name: user.name.clone(),
            email: user.email.clone(),
            exp: now + expires_secs.max(0) as usize,
        }
    }

    pub fn into_auth_user(self) -> Option<AuthUser> {
        let id = Uuid::parse_str(&self.sub).ok()?;
        Some(AuthUser {
            id,
            role: self.role,
            name: self.name,
            email: self.email,
        })
    }
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/auth/register", tag = "Auth", request_body = RegisterRequest, security(()), responses(
    (status = 200, body = User),
    (status = 400, body = ErrorBody),
    (status = 409, body = ErrorBody)
))]
pub async fn register(
    State(ctx): State<AppContext>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<Json<User>> {
    if req.name.trim().is_empty()
        || req.email.trim().is_empty()
        || req.password.is_empty()
        || req.role.trim().is_empty()
    {
        return Err(ApiError::bad_request("Missing fields"));
    }
    let repo = ctx.user_repo();
    let uc = RegisterUc {
        repo: repo.as_ref(),
    };
    let user = uc
        .execute(RegisterDto {
            email: req.email,
            name: req.name,
            password: req.password,
            role: req.role,
            class: req.class,
            section: req.section,
            subjects: req.subjects,
            classes: req.classes,
            phone: req.phone,
            address: req.address,
        })
        .await?;
    Ok(Json(user))
}

#[utoipa::path(post, path = "/api/auth/login", tag = "Auth", request_body = LoginRequest, security(()), responses(
    (status = 200, body = LoginResponse),
    (status = 401, body = ErrorBody)
))]
pub async fn login(
    State(ctx): State<AppContext>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<(HeaderMap, Json<LoginResponse>)> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Missing credentials"));
    }
    let repo = ctx.user_repo();
    let uc = LoginUc {
        repo: repo.as_ref(),
    };
    let user = uc
        .execute(&LoginDto {
            email: req.email,
            password: req.password,
        })
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;
    let token = issue_token(&ctx.cfg, &user)?;
    tracing::info!(user_id = %user.id, role = %user.role, "user_logged_in");

    // Set HttpOnly cookie with the access token
    let mut headers = HeaderMap::new();
    let cookie = build_access_cookie(&token, ctx.cfg.jwt_expires_secs, ctx.cfg.secure_cookies());
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        headers.insert(header::SET_COOKIE, value);
    }
    Ok((headers, Json(LoginResponse { token, user })))
}

#[utoipa::path(get, path = "/api/auth/me", tag = "Auth", responses(
    (status = 200, body = MeResponse),
    (status = 401, body = ErrorBody),
    (status = 404, body = ErrorBody)
))]
pub async fn me(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<MeResponse>> {
    let repo = ctx.user_repo();
    let uc = GetMe {
        repo: repo.as_ref(),
    };
    let row = uc
        .execute(user.id)
        .await?
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "User not found"))?;
    Ok(Json(MeResponse { user: row }))
}

#[utoipa::path(post, path = "/api/auth/logout", tag = "Auth", security(()), responses((status = 204)))]
pub async fn logout(State(ctx): State<AppContext>) -> (HeaderMap, StatusCode) {
    // Clear cookie by setting it expired
    let mut headers = HeaderMap::new();
    let cookie = build_access_cookie("", 0, ctx.cfg.secure_cookies());
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        headers.insert(header::SET_COOKIE, value);
    }
    (headers, StatusCode::NO_CONTENT)
}

// --- Bearer extractor & JWT utils ---

pub fn issue_token(cfg: &Config, user: &User) -> ApiResult<String> {
    jsonwebtoken::encode(
        &Header::default(),
        &Claims::for_user(user, cfg.jwt_expires_secs),
        &EncodingKey::from_secret(cfg.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::internal(e.into()))
}

pub fn validate_token(cfg: &Config, token: &str) -> Option<AuthUser> {
    jsonwebtoken::decode::<Claims>(
        token.trim(),
        &DecodingKey::from_secret(cfg.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .and_then(|data| data.claims.into_auth_user())
}

/// Raw token from the `Authorization` header, falling back to the
/// `access_token` cookie.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(t) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        return Some(t.trim().to_string());
    }
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| get_cookie(cookies, ACCESS_COOKIE))
        .filter(|t| !t.is_empty())
}

/// The authenticated caller. Rejects with 401 when the token is missing or
/// does not verify.
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl FromRequestParts<AppContext> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token =
            token_from_headers(&parts.headers).ok_or_else(|| ApiError::unauthorized("Missing token"))?;
        validate_token(&ctx.cfg, &token)
            .map(CurrentUser)
            .ok_or_else(|| ApiError::unauthorized("Invalid token"))
    }
}

// --- Cookie helpers ---

fn get_cookie(cookie_header: &str, name: &str) -> Option<String> {
    for part in cookie_header.split(';') {
        let kv = part.trim();
        if let Some((k, v)) = kv.split_once('=') {
            if k.trim() == name {
                return Some(v.trim().to_string());
            }
        }
    }
    None
}

fn build_access_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let secure_attr = if secure { "; Secure" } else { "" };
    format!(
        "{ACCESS_COOKIE}={}; HttpOnly{}; Path=/; Max-Age={}; SameSite=Lax",
        token,
        secure_attr,
        max_age_secs.max(0)
    )
}
