//! Complaint API handlers.
//!
//! ```text
//! POST /api/complaints {"title":"Wifi","body":"Wifi down","category":"WiFi"}
//! GET  /api/complaints
//! GET  /api/complaints/all
//! GET  /api/complaints/summary
//! GET  /api/complaints/{id}
//! POST /api/complaints/{id}/vote
//! PUT  /api/complaints/{id}/status {"status":"resolved"}
//! ```
//!
//! `/complaints/all` and `/complaints/summary` must be registered before
//! `/complaints/{id}` so the literal segments win.

use std::collections::BTreeMap;

use actix_web::{HttpResponse, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{
    AccountId, Complaint, ComplaintDraft, ComplaintId, ComplaintStatus, ComplaintWithAuthor,
    DashboardSummary, Error,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::AuthenticatedUser;
use crate::inbound::http::schemas::{ComplaintStatusSchema, ErrorSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, map_draft_error, parse_complaint_id, parse_status,
};

/// Wire representation of a complaint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: ComplaintId,
    #[schema(value_type = String, format = Uuid)]
    pub author: AccountId,
    /// Present only on the authenticated listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    pub title: Option<String>,
    pub body: String,
    pub category: String,
    /// Absent until the sentiment scorer has answered.
    pub sentiment: Option<f64>,
    pub votes: u32,
    #[schema(value_type = Vec<String>)]
    pub voted_by: Vec<AccountId>,
    #[schema(value_type = Option<String>, format = Uuid)]
    pub last_voter: Option<AccountId>,
    #[schema(value_type = ComplaintStatusSchema)]
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Complaint> for ComplaintResponse {
    fn from(complaint: Complaint) -> Self {
        let Complaint {
            id,
            author,
            title,
            body,
            category,
            sentiment,
            votes,
            voted_by,
            last_voter,
            status,
            created_at,
        } = complaint;
        Self {
            id,
            author,
            author_name: None,
            title,
            body,
            category,
            sentiment,
            votes,
            voted_by,
            last_voter,
            status,
            created_at,
        }
    }
}

impl From<ComplaintWithAuthor> for ComplaintResponse {
    fn from(value: ComplaintWithAuthor) -> Self {
        let ComplaintWithAuthor {
            complaint,
            author_name,
        } = value;
        Self {
            author_name: author_name.map(Into::into),
            ..complaint.into()
        }
    }
}

impl From<ComplaintResponse> for Complaint {
    fn from(response: ComplaintResponse) -> Self {
        Self {
            id: response.id,
            author: response.author,
            title: response.title,
            body: response.body,
            category: response.category,
            sentiment: response.sentiment,
            votes: response.votes,
            voted_by: response.voted_by,
            last_voter: response.last_voter,
            status: response.status,
            created_at: response.created_at,
        }
    }
}

/// Request body for `POST /api/complaints`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateComplaintRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub category: String,
}

/// Request body for the status endpoints.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    /// One of `pending`, `resolved`, `rejected`.
    #[serde(default)]
    #[schema(example = "resolved")]
    pub status: String,
}

/// Dashboard totals.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub total: usize,
    pub pending: usize,
    pub resolved: usize,
    pub rejected: usize,
    pub by_category: BTreeMap<String, usize>,
}

impl From<DashboardSummary> for DashboardResponse {
    fn from(summary: DashboardSummary) -> Self {
        Self {
            total: summary.total,
            pending: summary.pending,
            resolved: summary.resolved,
            rejected: summary.rejected,
            by_category: summary.by_category,
        }
    }
}

fn complaint_id(path: web::Path<String>) -> ApiResult<ComplaintId> {
    parse_complaint_id(&path.into_inner(), FieldName::new("id"))
}

/// Submit a complaint as the authenticated caller.
#[utoipa::path(
    post,
    path = "/api/complaints",
    request_body = CreateComplaintRequest,
    responses(
        (status = 201, description = "Complaint created", body = ComplaintResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["complaints"],
    operation_id = "createComplaint",
    security(("BearerAuth" = []))
)]
#[post("/complaints")]
pub async fn create_complaint(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreateComplaintRequest>,
) -> ApiResult<HttpResponse> {
    let CreateComplaintRequest {
        title,
        body,
        category,
    } = payload.into_inner();
    let draft = ComplaintDraft::try_from_parts(title.as_deref(), &body, &category)
        .map_err(|error| map_draft_error(&error))?;
    let complaint = state.complaints.create(user.identity(), draft).await?;
    Ok(HttpResponse::Created().json(ComplaintResponse::from(complaint)))
}

/// Every complaint with author names, newest first.
///
/// Clients narrow this to "my complaints" by comparing `author` with their
/// own account id.
#[utoipa::path(
    get,
    path = "/api/complaints",
    responses(
        (status = 200, description = "Complaints", body = [ComplaintResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["complaints"],
    operation_id = "listComplaints",
    security(("BearerAuth" = []))
)]
#[get("/complaints")]
pub async fn list_complaints(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<ComplaintResponse>>> {
    let complaints = state
        .complaints_query
        .list_with_authors(user.identity())
        .await?;
    Ok(web::Json(complaints.into_iter().map(Into::into).collect()))
}

/// Public feed of every complaint, newest first.
#[utoipa::path(
    get,
    path = "/api/complaints/all",
    responses(
        (status = 200, description = "Complaints", body = [ComplaintResponse]),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["complaints"],
    operation_id = "listAllComplaints",
    security([])
)]
#[get("/complaints/all")]
pub async fn list_all_complaints(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<ComplaintResponse>>> {
    let complaints = state.complaints_query.list_all().await?;
    Ok(web::Json(complaints.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/complaints/summary",
    responses(
        (status = 200, description = "Dashboard totals", body = DashboardResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["complaints"],
    operation_id = "complaintSummary",
    security(("BearerAuth" = []))
)]
#[get("/complaints/summary")]
pub async fn complaint_summary(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<DashboardResponse>> {
    let summary = state.complaints_query.summary(user.identity()).await?;
    Ok(web::Json(summary.into()))
}

#[utoipa::path(
    get,
    path = "/api/complaints/{id}",
    params(("id" = String, Path, description = "Complaint UUID")),
    responses(
        (status = 200, description = "Complaint", body = ComplaintResponse),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["complaints"],
    operation_id = "getComplaint",
    security([])
)]
#[get("/complaints/{id}")]
pub async fn get_complaint(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ComplaintResponse>> {
    let id = complaint_id(path)?;
    let complaint = state.complaints_query.get(id).await?;
    Ok(web::Json(complaint.into()))
}

/// Add the caller's vote. Each account may vote once per complaint.
#[utoipa::path(
    post,
    path = "/api/complaints/{id}/vote",
    params(("id" = String, Path, description = "Complaint UUID")),
    responses(
        (status = 200, description = "Updated complaint", body = ComplaintResponse),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Already voted", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["complaints"],
    operation_id = "voteComplaint",
    security(("BearerAuth" = []))
)]
#[post("/complaints/{id}/vote")]
pub async fn vote_complaint(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<ComplaintResponse>> {
    let id = complaint_id(path)?;
    let complaint = state.complaints.vote(user.identity(), id).await?;
    Ok(web::Json(complaint.into()))
}

/// Decode the status body. Runs after the role check.
fn status_request(body: &[u8]) -> Result<UpdateStatusRequest, Error> {
    serde_json::from_slice(body).map_err(|error| {
        Error::invalid_request(format!("invalid request body: {error}"))
            .with_details(json!({"code": "malformed_json"}))
    })
}

async fn apply_status(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<web::Json<ComplaintResponse>> {
    let caller = user.require_admin()?;
    let id = complaint_id(path)?;
    let payload = status_request(&body)?;
    let status = parse_status(&payload.status, FieldName::new("status"))?;
    let complaint = state.complaints.set_status(caller, id, status).await?;
    Ok(web::Json(complaint.into()))
}

/// Overwrite the triage status. Admin only.
#[utoipa::path(
    put,
    path = "/api/complaints/{id}/status",
    params(("id" = String, Path, description = "Complaint UUID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Updated complaint", body = ComplaintResponse),
        (status = 400, description = "Invalid id or status", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["complaints"],
    operation_id = "updateComplaintStatus",
    security(("BearerAuth" = []))
)]
#[put("/complaints/{id}/status")]
pub async fn update_status(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<web::Json<ComplaintResponse>> {
    apply_status(state, user, path, body).await
}

/// Admin console alias of [`update_status`].
#[utoipa::path(
    put,
    path = "/api/admin/complaints/{id}/status",
    params(("id" = String, Path, description = "Complaint UUID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Updated complaint", body = ComplaintResponse),
        (status = 400, description = "Invalid id or status", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminUpdateComplaintStatus",
    security(("BearerAuth" = []))
)]
#[put("/admin/complaints/{id}/status")]
pub async fn admin_update_status(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<web::Json<ComplaintResponse>> {
    apply_status(state, user, path, body).await
}

/// Register every complaint route on `cfg`, literal paths first.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_complaint)
        .service(list_complaints)
        .service(list_all_complaints)
        .service(complaint_summary)
        .service(get_complaint)
        .service(vote_complaint)
        .service(update_status)
        .service(admin_update_status);
}

#[cfg(test)]
#[path = "complaints_tests.rs"]
mod tests;
