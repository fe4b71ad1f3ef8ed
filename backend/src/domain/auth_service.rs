//! Authentication gate service.
//!
//! Implements account registration, credential login, and bearer credential
//! verification on top of the account repository, credential hasher, and
//! token codec ports.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::TimeDelta;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, AccountsCommand, Authenticator, CredentialHasher,
    CredentialHasherError, LoginOutcome, TokenCodec, TokenCodecError,
};
use crate::domain::{
    Account, AccountId, AccountSummary, BearerToken, Error, Identity, LoginCredentials,
    Registration, TokenGrant,
};

/// Validity window of issued bearer credentials unless configured otherwise.
pub const DEFAULT_TOKEN_TTL: TimeDelta = TimeDelta::days(1);

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Account service implementing the authentication driving ports.
#[derive(Clone)]
pub struct AccountService<R, H, T> {
    accounts: Arc<R>,
    hasher: Arc<H>,
    tokens: Arc<T>,
    clock: Arc<dyn Clock + Send + Sync>,
    token_ttl: TimeDelta,
}

impl<R, H, T> AccountService<R, H, T> {
    /// Create a service issuing credentials valid for [`DEFAULT_TOKEN_TTL`].
    pub fn new(
        accounts: Arc<R>,
        hasher: Arc<H>,
        tokens: Arc<T>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            accounts,
            hasher,
            tokens,
            clock,
            token_ttl: DEFAULT_TOKEN_TTL,
        }
    }

    /// Override the credential validity window.
    #[must_use]
    pub fn with_token_ttl(mut self, token_ttl: TimeDelta) -> Self {
        self.token_ttl = token_ttl;
        self
    }
}

fn map_account_error(error: AccountRepositoryError) -> Error {
    match error {
        AccountRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("account repository unavailable: {message}"))
        }
        AccountRepositoryError::Query { message } => {
            Error::internal(format!("account repository error: {message}"))
        }
        AccountRepositoryError::DuplicateEmail { .. } => duplicate_email(),
    }
}

fn map_hasher_error(error: CredentialHasherError) -> Error {
    Error::internal(error.to_string())
}

fn map_encode_error(error: TokenCodecError) -> Error {
    Error::internal(format!("failed to issue bearer credential: {error}"))
}

fn duplicate_email() -> Error {
    Error::conflict("user already exists").with_details(json!({
        "field": "email",
        "code": "duplicate_email",
    }))
}

impl<R, H, T> AccountService<R, H, T>
where
    R: AccountRepository,
    H: CredentialHasher,
    T: TokenCodec,
{
    async fn verified_account(&self, credentials: &LoginCredentials) -> Result<Account, Error> {
        let account = self
            .accounts
            .find_by_email(credentials.email())
            .await
            .map_err(map_account_error)?
            .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS))?;

        let matches = self
            .hasher
            .verify(credentials.password(), &account.password_hash)
            .await
            .map_err(map_hasher_error)?;
        if matches {
            Ok(account)
        } else {
            Err(Error::unauthorized(INVALID_CREDENTIALS))
        }
    }

    fn issue_for(&self, account: &Account) -> Result<BearerToken, Error> {
        let issued_at = self.clock.utc();
        let expires_at = issued_at
            .checked_add_signed(self.token_ttl)
            .ok_or_else(|| Error::internal("bearer credential expiry out of range"))?;
        let grant = TokenGrant {
            account_id: account.id,
            role: account.role,
            issued_at,
            expires_at,
        };
        self.tokens.issue(&grant).map_err(map_encode_error)
    }
}

#[async_trait]
impl<R, H, T> AccountsCommand for AccountService<R, H, T>
where
    R: AccountRepository,
    H: CredentialHasher,
    T: TokenCodec,
{
    async fn register(&self, registration: Registration) -> Result<AccountSummary, Error> {
        let existing = self
            .accounts
            .find_by_email(registration.email().as_ref())
            .await
            .map_err(map_account_error)?;
        if existing.is_some() {
            return Err(duplicate_email());
        }

        let password_hash = self
            .hasher
            .hash(registration.password())
            .await
            .map_err(map_hasher_error)?;
        let account = Account {
            id: AccountId::random(),
            name: registration.name().clone(),
            email: registration.email().clone(),
            password_hash,
            role: registration.role(),
        };
        self.accounts
            .insert(&account)
            .await
            .map_err(map_account_error)?;

        info!(account_id = %account.id, role = %account.role, "account registered");
        Ok(account.summary())
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<LoginOutcome, Error> {
        let account = self.verified_account(&credentials).await?;
        let token = self.issue_for(&account)?;
        debug!(account_id = %account.id, "bearer credential issued");
        Ok(LoginOutcome {
            token,
            account: account.summary(),
        })
    }
}

impl<R, H, T> Authenticator for AccountService<R, H, T>
where
    R: AccountRepository,
    H: CredentialHasher,
    T: TokenCodec,
{
    fn authenticate(&self, token: Option<&BearerToken>) -> Result<Identity, Error> {
        let token = token.ok_or_else(|| Error::unauthorized("no token"))?;
        let grant = self.tokens.decode(token).map_err(|error| {
            debug!(%error, "bearer credential rejected");
            Error::unauthorized("invalid token")
        })?;
        if grant.is_expired_at(self.clock.utc()) {
            debug!(account_id = %grant.account_id, "bearer credential expired");
            return Err(Error::unauthorized("token expired"));
        }
        Ok(Identity::from(&grant))
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
