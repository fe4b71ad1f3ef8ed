//! Port abstraction for account directory adapters and their errors.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{Account, AccountId, DisplayName};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by account repository adapters.
    pub enum AccountRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "account repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "account repository query failed: {message}",
        /// The email is already registered.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

/// Storage for registered accounts.
///
/// Email uniqueness is enforced by the adapter: a second `insert` with the
/// same address must fail with [`AccountRepositoryError::DuplicateEmail`]
/// and leave the directory unchanged.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Persist a new account.
    async fn insert(&self, account: &Account) -> Result<(), AccountRepositoryError>;

    /// Fetch an account by exact (case-sensitive) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountRepositoryError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError>;

    /// Resolve display names for a batch of account ids. Unknown ids are
    /// omitted from the result.
    async fn display_names(
        &self,
        ids: &[AccountId],
    ) -> Result<HashMap<AccountId, DisplayName>, AccountRepositoryError>;
}
