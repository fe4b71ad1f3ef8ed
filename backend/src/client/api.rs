//! Reqwest-backed client for the grievance REST API.
//!
//! Requests and responses reuse the server's wire types, so a field renamed
//! on one side is renamed on both.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::domain::{ComplaintId, ComplaintStatus, Error};
use crate::inbound::http::accounts::{
    AccountResponse, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
};
use crate::inbound::http::complaints::{
    ComplaintResponse, CreateComplaintRequest, DashboardResponse, UpdateStatusRequest,
};

use super::session::Session;

/// Default request timeout for CLI calls.
pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Failures talking to the API.
#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("invalid API url: {message}")]
    Url { message: String },
    #[error("request failed: {message}")]
    Transport { message: String },
    #[error("server rejected the request: {0}")]
    Api(Error),
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("invalid response payload: {message}")]
    Decode { message: String },
    #[error("this command requires a signed-in session")]
    NotSignedIn,
}

impl ApiClientError {
    fn transport(error: &reqwest::Error) -> Self {
        Self::Transport {
            message: error.to_string(),
        }
    }

    /// The server's error payload, when the failure came from the API.
    pub fn api_error(&self) -> Option<&Error> {
        match self {
            Self::Api(error) => Some(error),
            _ => None,
        }
    }
}

/// Typed API client. Holds the bearer credential of the current session, if
/// any.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
    token: Option<String>,
}

impl ApiClient {
    /// Build a client for the server at `base` (scheme, host, and port).
    ///
    /// # Errors
    /// Returns [`ApiClientError::Transport`] when the HTTP client cannot be
    /// built.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, ApiClientError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| ApiClientError::transport(&error))?;
        Ok(Self {
            http,
            base,
            token: None,
        })
    }

    /// Attach the bearer credential of `session`; `None` stays anonymous.
    #[must_use]
    pub fn with_session(mut self, session: Option<&Session>) -> Self {
        self.token = session.map(|session| session.token.clone());
        self
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }

    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<AccountResponse, ApiClientError> {
        let response: RegisterResponse = self
            .send_json(Method::POST, "/api/auth/register", Some(request), false)
            .await?;
        Ok(response.account)
    }

    /// Log in and return the session to cache.
    pub async fn login(&self, request: &LoginRequest) -> Result<Session, ApiClientError> {
        let response: LoginResponse = self
            .send_json(Method::POST, "/api/auth/login", Some(request), false)
            .await?;
        Ok(Session {
            token: response.token,
            account: response.account,
        })
    }

    pub async fn submit(
        &self,
        request: &CreateComplaintRequest,
    ) -> Result<ComplaintResponse, ApiClientError> {
        self.send_json(Method::POST, "/api/complaints", Some(request), true)
            .await
    }

    /// Every complaint with author names. Requires a session.
    pub async fn list_with_authors(&self) -> Result<Vec<ComplaintResponse>, ApiClientError> {
        self.send_json(Method::GET, "/api/complaints", None::<&()>, true)
            .await
    }

    /// Every complaint, without author names. Public.
    pub async fn list_all(&self) -> Result<Vec<ComplaintResponse>, ApiClientError> {
        self.send_json(Method::GET, "/api/complaints/all", None::<&()>, false)
            .await
    }

    pub async fn get(&self, id: &ComplaintId) -> Result<ComplaintResponse, ApiClientError> {
        self.send_json(Method::GET, &format!("/api/complaints/{id}"), None::<&()>, false)
            .await
    }

    pub async fn vote(&self, id: &ComplaintId) -> Result<ComplaintResponse, ApiClientError> {
        self.send_json(
            Method::POST,
            &format!("/api/complaints/{id}/vote"),
            None::<&()>,
            true,
        )
        .await
    }

    /// Overwrite a complaint's status through the admin route.
    pub async fn set_status(
        &self,
        id: &ComplaintId,
        status: ComplaintStatus,
    ) -> Result<ComplaintResponse, ApiClientError> {
        let body = UpdateStatusRequest {
            status: status.as_str().to_owned(),
        };
        self.send_json(
            Method::PUT,
            &format!("/api/admin/complaints/{id}/status"),
            Some(&body),
            true,
        )
        .await
    }

    /// Server-side dashboard totals. Requires an admin session.
    pub async fn summary(&self) -> Result<DashboardResponse, ApiClientError> {
        self.send_json(Method::GET, "/api/complaints/summary", None::<&()>, true)
            .await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiClientError> {
        self.base.join(path).map_err(|error| ApiClientError::Url {
            message: error.to_string(),
        })
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        authenticated: bool,
    ) -> Result<RequestBuilder, ApiClientError> {
        let builder = self.http.request(method, self.endpoint(path)?);
        if !authenticated {
            return Ok(builder);
        }
        let token = self.token.as_deref().ok_or(ApiClientError::NotSignedIn)?;
        Ok(builder.bearer_auth(token))
    }

    async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        authenticated: bool,
    ) -> Result<T, ApiClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(%method, path, "calling grievance API");
        let mut builder = self.request(method, path, authenticated)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder
            .send()
            .await
            .map_err(|error| ApiClientError::transport(&error))?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiClientError> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|error| ApiClientError::transport(&error))?;
    if status.is_success() {
        return serde_json::from_slice(&bytes).map_err(|error| ApiClientError::Decode {
            message: error.to_string(),
        });
    }
    Err(decode_failure(status, &bytes))
}

fn decode_failure(status: StatusCode, body: &[u8]) -> ApiClientError {
    match serde_json::from_slice::<Error>(body) {
        Ok(error) => ApiClientError::Api(error),
        Err(_) => ApiClientError::UnexpectedStatus {
            status: status.as_u16(),
            body: String::from_utf8_lossy(body).chars().take(160).collect(),
        },
    }
}
