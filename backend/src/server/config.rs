//! Application settings and the server configuration built from them.
//!
//! [`AppConfig`] is loaded by OrthoConfig from `GRIEVANCE_*` environment
//! variables, CLI flags, and config files. [`ServerConfig`] is the resolved,
//! builder-style value handed to [`super::create_server`].

use std::net::SocketAddr;
use std::time::Duration;

use chrono::TimeDelta;
use grievances::domain::{DEFAULT_SCORING_TIMEOUT, DEFAULT_TOKEN_TTL};
use grievances::outbound::persistence::DbPool;
use ortho_config::OrthoConfig;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::Deserialize;
use tracing::warn;
use url::Url;
use zeroize::Zeroizing;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SENTIMENT_URL: &str = "http://127.0.0.1:8000/analyze";
const EPHEMERAL_SECRET_LEN: usize = 32;
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 366;

/// Raw settings recognised by the server binary.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "GRIEVANCE")]
pub struct AppConfig {
    /// Listen address.
    #[ortho_config(default = DEFAULT_BIND_ADDR.to_owned())]
    pub bind_addr: String,
    /// PostgreSQL URL. In-memory stores are used when unset.
    pub database_url: Option<String>,
    /// HS256 signing secret for bearer credentials.
    pub jwt_secret: Option<String>,
    /// Sentiment scorer endpoint receiving `{"text": ...}`.
    pub sentiment_url: Option<String>,
    /// Bound on the synchronous sentiment call, in milliseconds.
    pub sentiment_timeout_ms: Option<u64>,
    /// Bearer credential lifetime in hours.
    pub token_ttl_hours: Option<i64>,
    /// Maximum pooled database connections.
    pub db_pool_size: Option<u32>,
}

/// Errors raised while resolving [`AppConfig`] into a [`ServerConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid bind address {value}: {message}")]
    BindAddr { value: String, message: String },
    #[error("invalid sentiment url {value}: {message}")]
    SentimentUrl { value: String, message: String },
    #[error("GRIEVANCE_JWT_SECRET must be set in release builds")]
    MissingJwtSecret,
    #[error("token lifetime must be between 1 and {max} hours, got {hours}", max = MAX_TOKEN_TTL_HOURS)]
    TokenTtl { hours: i64 },
}

impl AppConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = self.bind_addr.as_str();
        raw.parse().map_err(|err: std::net::AddrParseError| ConfigError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    pub fn sentiment_url(&self) -> Result<Url, ConfigError> {
        let raw = self.sentiment_url.as_deref().unwrap_or(DEFAULT_SENTIMENT_URL);
        Url::parse(raw).map_err(|err| ConfigError::SentimentUrl {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    pub fn sentiment_timeout(&self) -> Duration {
        self.sentiment_timeout_ms
            .map_or(DEFAULT_SCORING_TIMEOUT, Duration::from_millis)
    }

    pub fn token_ttl(&self) -> Result<TimeDelta, ConfigError> {
        match self.token_ttl_hours {
            None => Ok(DEFAULT_TOKEN_TTL),
            Some(hours) if (1..=MAX_TOKEN_TTL_HOURS).contains(&hours) => {
                TimeDelta::try_hours(hours).ok_or(ConfigError::TokenTtl { hours })
            }
            Some(hours) => Err(ConfigError::TokenTtl { hours }),
        }
    }

    /// Signing secret for bearer credentials.
    ///
    /// Without a configured secret, `allow_ephemeral` decides between a
    /// random per-process secret (tokens die with the process) and failure.
    pub fn jwt_secret(&self, allow_ephemeral: bool) -> Result<Zeroizing<Vec<u8>>, ConfigError> {
        match self.jwt_secret.as_deref().filter(|secret| !secret.is_empty()) {
            Some(secret) => Ok(Zeroizing::new(secret.as_bytes().to_vec())),
            None if allow_ephemeral => {
                warn!("GRIEVANCE_JWT_SECRET unset; using an ephemeral signing secret (dev only)");
                let mut secret = Zeroizing::new(vec![0_u8; EPHEMERAL_SECRET_LEN]);
                OsRng.fill_bytes(secret.as_mut_slice());
                Ok(secret)
            }
            None => Err(ConfigError::MissingJwtSecret),
        }
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) jwt_secret: Zeroizing<Vec<u8>>,
    pub(crate) token_ttl: TimeDelta,
    pub(crate) sentiment_url: Url,
    pub(crate) sentiment_timeout: Duration,
    pub(crate) db_pool: Option<DbPool>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Resolve raw settings. `allow_ephemeral_secret` is normally
    /// `cfg!(debug_assertions)`.
    pub fn from_app_config(
        config: &AppConfig,
        allow_ephemeral_secret: bool,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: config.bind_addr()?,
            jwt_secret: config.jwt_secret(allow_ephemeral_secret)?,
            token_ttl: config.token_ttl()?,
            sentiment_url: config.sentiment_url()?,
            sentiment_timeout: config.sentiment_timeout(),
            db_pool: None,
            #[cfg(feature = "metrics")]
            prometheus: None,
        })
    }

    /// Attach a database connection pool. Without one the server runs on
    /// in-memory stores.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
