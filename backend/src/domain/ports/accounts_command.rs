//! Driving ports for the authentication gate.
//!
//! Inbound adapters call these to register accounts, exchange credentials
//! for a bearer token, and turn a presented token into an [`Identity`].

use async_trait::async_trait;

use crate::domain::{AccountSummary, BearerToken, Error, Identity, LoginCredentials, Registration};

/// Successful login: a signed bearer credential plus the public account view.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: BearerToken,
    pub account: AccountSummary,
}

/// Account registration and login use-cases.
#[async_trait]
pub trait AccountsCommand: Send + Sync {
    /// Create an account. Fails with `Conflict` when the email is taken.
    async fn register(&self, registration: Registration) -> Result<AccountSummary, Error>;

    /// Verify credentials and issue a bearer credential. Unknown emails and
    /// wrong passwords both fail with the same `Unauthorized` error.
    async fn login(&self, credentials: LoginCredentials) -> Result<LoginOutcome, Error>;
}

/// Bearer credential verification used as a guard on protected operations.
pub trait Authenticator: Send + Sync {
    /// Resolve the caller identity. Absent, malformed, badly signed, or
    /// expired credentials fail with `Unauthorized`.
    fn authenticate(&self, token: Option<&BearerToken>) -> Result<Identity, Error>;
}
