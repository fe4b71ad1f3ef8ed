//! Port for one-way password hashing.

use async_trait::async_trait;

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential hasher adapters.
    pub enum CredentialHasherError {
        /// Hashing failed (parameters or salt generation).
        Hash { message: String } => "password hashing failed: {message}",
        /// The stored hash could not be parsed.
        Corrupt { message: String } => "stored password hash is invalid: {message}",
    }
}

/// Salted one-way hashing of account passwords.
///
/// Hashing is CPU-bound, so adapters may move the work off the async
/// executor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialHasher: Send + Sync {
    /// Hash `password` with a fresh random salt.
    async fn hash(&self, password: &str) -> Result<PasswordHash, CredentialHasherError>;

    /// Check `password` against a stored hash.
    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, CredentialHasherError>;
}
