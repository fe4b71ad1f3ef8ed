//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled for tests or with the
//! `test-support` feature.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use argon2::Params;
use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{SentimentScorer, SentimentScorerError};
use crate::domain::{AccountService, ComplaintService};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::{InMemoryAccountRepository, InMemoryComplaintRepository};
use crate::outbound::security::{Argon2CredentialHasher, JwtTokenCodec};

/// Secret used by [`test_codec`].
pub const TEST_JWT_SECRET: &[u8] = b"grievance-test-secret";

/// Fixed instant used as the default "now" in tests.
pub fn fixed_now() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).single() {
        Some(now) => now,
        None => panic!("fixed test timestamp must be valid"),
    }
}

/// Clock whose time only moves when a test advances it.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: TimeDelta) {
        *self.lock_clock() += delta;
    }

    pub fn advance_seconds(&self, seconds: i64) {
        self.advance(TimeDelta::seconds(seconds));
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Sentiment scorer replaying queued results in order.
///
/// Once the queue is drained every call fails with a transport error, which
/// mirrors an unreachable scorer.
#[derive(Default)]
pub struct ScriptedSentimentScorer {
    responses: Mutex<VecDeque<Result<f64, SentimentScorerError>>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedSentimentScorer {
    /// Scorer answering every call with the given results, then failing.
    pub fn new(responses: impl IntoIterator<Item = Result<f64, SentimentScorerError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Scorer that always fails.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Sleep before answering, to exercise the caller's time bound.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `score` calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> Result<f64, SentimentScorerError> {
        let mut queue = match self.responses.lock() {
            Ok(queue) => queue,
            Err(_) => panic!("scorer mutex"),
        };
        queue
            .pop_front()
            .unwrap_or_else(|| Err(SentimentScorerError::transport("scorer unreachable")))
    }
}

#[async_trait]
impl SentimentScorer for ScriptedSentimentScorer {
    async fn score(&self, _text: &str) -> Result<f64, SentimentScorerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.next_response()
    }
}

/// Argon2id hasher with minimal cost parameters for fast tests.
pub fn fast_hasher() -> Argon2CredentialHasher {
    match Params::new(Params::MIN_M_COST, 1, 1, None) {
        Ok(params) => Argon2CredentialHasher::with_params(params),
        Err(error) => panic!("minimal argon2 params: {error}"),
    }
}

/// Token codec signing with [`TEST_JWT_SECRET`].
pub fn test_codec() -> JwtTokenCodec {
    JwtTokenCodec::new(TEST_JWT_SECRET)
}

pub type TestAccountService =
    AccountService<InMemoryAccountRepository, Argon2CredentialHasher, JwtTokenCodec>;
pub type TestComplaintService =
    ComplaintService<InMemoryComplaintRepository, InMemoryAccountRepository, ScriptedSentimentScorer>;

/// In-memory wiring of both services with controllable clock and scorer.
pub struct TestServices {
    pub accounts: Arc<InMemoryAccountRepository>,
    pub complaints: Arc<InMemoryComplaintRepository>,
    pub scorer: Arc<ScriptedSentimentScorer>,
    pub clock: Arc<MutableClock>,
    pub account_service: Arc<TestAccountService>,
    pub complaint_service: Arc<TestComplaintService>,
}

impl TestServices {
    /// Wire services around `scorer`, starting the clock at [`fixed_now`].
    pub fn new(scorer: ScriptedSentimentScorer) -> Self {
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let complaints = Arc::new(InMemoryComplaintRepository::new());
        let scorer = Arc::new(scorer);
        let clock = Arc::new(MutableClock::new(fixed_now()));
        let account_service = Arc::new(AccountService::new(
            Arc::clone(&accounts),
            Arc::new(fast_hasher()),
            Arc::new(test_codec()),
            clock.clone(),
        ));
        let complaint_service = Arc::new(
            ComplaintService::new(
                Arc::clone(&complaints),
                Arc::clone(&accounts),
                Arc::clone(&scorer),
                clock.clone(),
            )
            .with_scoring_timeout(Duration::from_millis(200)),
        );
        Self {
            accounts,
            complaints,
            scorer,
            clock,
            account_service,
            complaint_service,
        }
    }

    /// HTTP state backed by these services.
    pub fn http_state(&self) -> HttpState {
        HttpState::new(
            self.account_service.clone(),
            self.account_service.clone(),
            self.complaint_service.clone(),
            self.complaint_service.clone(),
        )
    }
}

/// Yield to the runtime until `check` passes, for detached-task assertions.
pub async fn eventually<F>(mut check: F) -> bool
where
    F: AsyncFnMut() -> bool,
{
    for _ in 0..200 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}
