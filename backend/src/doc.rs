//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: account, complaint, and health endpoints from the inbound layer
//! - **Schemas**: request/response DTOs plus domain type wrappers
//!   ([`ErrorSchema`], [`ErrorCodeSchema`], [`RoleSchema`],
//!   [`ComplaintStatusSchema`]) that keep the domain free of utoipa
//! - **Security**: HS256 bearer credential issued by `POST /api/auth/login`
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::accounts::{
    AccountResponse, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
};
use crate::inbound::http::complaints::{
    ComplaintResponse, CreateComplaintRequest, DashboardResponse, UpdateStatusRequest,
};
use crate::inbound::http::health::ProbeStatus;
use crate::inbound::http::schemas::{
    ComplaintStatusSchema, ErrorCodeSchema, ErrorSchema, RoleSchema,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the bearer security scheme referenced by protected paths.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Enrich the generated document with the bearer security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Credential issued by POST /api/auth/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Campus grievances API",
        description = "Accounts, bearer authentication, complaint triage, and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::complaints::create_complaint,
        crate::inbound::http::complaints::list_complaints,
        crate::inbound::http::complaints::list_all_complaints,
        crate::inbound::http::complaints::complaint_summary,
        crate::inbound::http::complaints::get_complaint,
        crate::inbound::http::complaints::vote_complaint,
        crate::inbound::http::complaints::update_status,
        crate::inbound::http::complaints::admin_update_status,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        RegisterRequest,
        RegisterResponse,
        LoginRequest,
        LoginResponse,
        AccountResponse,
        CreateComplaintRequest,
        UpdateStatusRequest,
        ComplaintResponse,
        DashboardResponse,
        ProbeStatus,
        RoleSchema,
        ComplaintStatusSchema,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "complaints", description = "Complaint submission, voting, and triage"),
        (name = "admin", description = "Administrator console routes"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
