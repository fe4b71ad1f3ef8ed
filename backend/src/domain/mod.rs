//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define strongly typed entities shared by the API, persistence,
//! and client layers, plus the services implementing the driving ports.
//! Types validate on construction and document their invariants and serde
//! contracts in their Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — transport-agnostic error payload.
//! - Account, Role, Identity — who is calling and what they may do.
//! - Complaint, ComplaintStatus — the grievance record and its lifecycle.
//! - DashboardSummary — aggregate counts over a complaint list.
//! - AccountService, ComplaintService — driving port implementations.

pub mod account;
pub mod auth;
pub mod auth_service;
pub mod complaint;
pub mod complaint_service;
pub mod dashboard;
pub mod demo_seed;
pub mod error;
pub mod ports;
pub mod trace_id;

pub use self::account::{
    Account, AccountId, AccountSummary, AccountValidationError, DISPLAY_NAME_MAX, DisplayName,
    EmailAddress, PasswordHash, Role,
};
pub use self::auth::{
    BearerToken, Identity, LoginCredentials, LoginValidationError, Registration,
    RegistrationValidationError, TokenGrant,
};
pub use self::auth_service::{AccountService, DEFAULT_TOKEN_TTL};
pub use self::complaint::{
    Complaint, ComplaintDraft, ComplaintId, ComplaintStatus, ComplaintValidationError,
    ComplaintWithAuthor, NewComplaint, sort_newest_first,
};
pub use self::complaint_service::{ComplaintService, DEFAULT_SCORING_TIMEOUT};
pub use self::dashboard::DashboardSummary;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::trace_id::TraceId;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use grievances::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
