//! Account API handlers.
//!
//! ```text
//! POST /api/auth/register {"name":"Ana","email":"ana@x.com","password":"pw"}
//! POST /api/auth/login {"email":"ana@x.com","password":"pw"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{AccountId, AccountSummary, LoginCredentials, Registration, Role};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, RoleSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{map_login_error, map_registration_error};

/// Request body for `POST /api/auth/register`.
///
/// Missing string fields are treated as blank so they fail validation with a
/// field-specific error.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// `student` (default) or `admin`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Request body for `POST /api/auth/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: AccountId,
    pub name: String,
    pub email: String,
    #[schema(value_type = RoleSchema)]
    pub role: Role,
}

impl From<AccountSummary> for AccountResponse {
    fn from(summary: AccountSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name.into(),
            email: summary.email.into(),
            role: summary.role,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    #[schema(example = "Registration successful")]
    pub message: String,
    pub account: AccountResponse,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[schema(example = "Login successful")]
    pub message: String,
    /// HS256 bearer credential valid for one day.
    pub token: String,
    pub account: AccountResponse,
}

/// Create a student or admin account.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        name,
        email,
        password,
        role,
    } = payload.into_inner();
    let registration = Registration::try_from_parts(&name, &email, &password, role.as_deref())
        .map_err(|error| map_registration_error(&error))?;
    let account = state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "Registration successful".to_owned(),
        account: account.into(),
    }))
}

/// Exchange email and password for a bearer credential.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&email, &password).map_err(|error| map_login_error(&error))?;
    let outcome = state.accounts.login(credentials).await?;
    Ok(web::Json(LoginResponse {
        message: "Login successful".to_owned(),
        token: outcome.token.as_str().to_owned(),
        account: outcome.account.into(),
    }))
}

/// Register the account routes on a scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(register).service(login);
}
