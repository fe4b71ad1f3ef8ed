//! Test helpers for inbound HTTP components.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::ports::Authenticator;
use crate::domain::{AccountId, BearerToken, Error, Identity, Role};
use crate::test_support::{ScriptedSentimentScorer, TestServices};

use super::state::HttpState;

/// Authenticator accepting a fixed set of literal tokens.
#[derive(Debug, Default)]
pub struct StubAuthenticator {
    tokens: HashMap<String, Identity>,
}

impl StubAuthenticator {
    pub fn accepting(token: &str, account_id: AccountId, role: Role) -> Self {
        Self::default().with(token, account_id, role)
    }

    #[must_use]
    pub fn with(mut self, token: &str, account_id: AccountId, role: Role) -> Self {
        self.tokens
            .insert(token.to_owned(), Identity { account_id, role });
        self
    }
}

impl Authenticator for StubAuthenticator {
    fn authenticate(&self, token: Option<&BearerToken>) -> Result<Identity, Error> {
        let token = token.ok_or_else(|| Error::unauthorized("no token"))?;
        self.tokens
            .get(token.as_str())
            .copied()
            .ok_or_else(|| Error::unauthorized("invalid token"))
    }
}

/// In-memory HTTP state whose authenticator is replaced by `auth`.
pub fn stub_state(auth: StubAuthenticator) -> HttpState {
    let services = TestServices::new(ScriptedSentimentScorer::unavailable());
    let mut state = services.http_state();
    state.auth = Arc::new(auth);
    state
}
