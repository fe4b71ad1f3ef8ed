//! Builders wiring repositories, adapters, and services into [`HttpState`].

use std::sync::Arc;

use grievances::domain::ports::{AccountRepository, ComplaintRepository};
use grievances::domain::{AccountService, ComplaintService};
use grievances::inbound::http::state::HttpState;
use grievances::outbound::memory::{InMemoryAccountRepository, InMemoryComplaintRepository};
use grievances::outbound::persistence::{DieselAccountRepository, DieselComplaintRepository};
use grievances::outbound::security::{Argon2CredentialHasher, JwtTokenCodec};
use grievances::outbound::sentiment::HttpSentimentScorer;
use mockable::DefaultClock;
use tracing::{info, warn};

use super::ServerConfig;

/// Wire both services around the given stores.
fn wire<A, C>(
    accounts: Arc<A>,
    complaints: Arc<C>,
    scorer: Arc<HttpSentimentScorer>,
    config: &ServerConfig,
) -> HttpState
where
    A: AccountRepository + 'static,
    C: ComplaintRepository + 'static,
{
    let clock = Arc::new(DefaultClock);
    let account_service = Arc::new(
        AccountService::new(
            Arc::clone(&accounts),
            Arc::new(Argon2CredentialHasher::new()),
            Arc::new(JwtTokenCodec::new(&config.jwt_secret)),
            clock.clone(),
        )
        .with_token_ttl(config.token_ttl),
    );
    let complaint_service = Arc::new(
        ComplaintService::new(complaints, accounts, scorer, clock)
            .with_scoring_timeout(config.sentiment_timeout),
    );
    HttpState::new(
        account_service.clone(),
        account_service,
        complaint_service.clone(),
        complaint_service,
    )
}

/// Build HTTP state backed by PostgreSQL when a pool is configured, otherwise
/// by in-memory stores that vanish on restart.
///
/// # Errors
/// Returns [`std::io::Error`] if the sentiment HTTP client cannot be built.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let scorer = HttpSentimentScorer::new(config.sentiment_url.clone(), config.sentiment_timeout)
        .map_err(|err| std::io::Error::other(format!("sentiment client: {err}")))?;
    let scorer = Arc::new(scorer);
    info!(endpoint = %config.sentiment_url, "sentiment scorer configured");

    let state = match &config.db_pool {
        Some(pool) => wire(
            Arc::new(DieselAccountRepository::new(pool.clone())),
            Arc::new(DieselComplaintRepository::new(pool.clone())),
            scorer,
            config,
        ),
        None => {
            warn!("no database configured; using in-memory stores");
            wire(
                Arc::new(InMemoryAccountRepository::new()),
                Arc::new(InMemoryComplaintRepository::new()),
                scorer,
                config,
            )
        }
    };
    Ok(state)
}
