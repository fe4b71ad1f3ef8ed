//! Argon2id-backed `CredentialHasher` adapter.
//!
//! Hashes are stored as PHC strings, so verification reads the cost
//! parameters and salt from the stored value rather than from this adapter.

use argon2::password_hash::{
    self, PasswordHash as PhcString, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::domain::PasswordHash;
use crate::domain::ports::{CredentialHasher, CredentialHasherError};

/// Argon2id password hasher with a random 16-byte salt per hash.
#[derive(Debug, Clone)]
pub struct Argon2CredentialHasher {
    params: Params,
}

impl Default for Argon2CredentialHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl Argon2CredentialHasher {
    /// Hasher using the crate's recommended Argon2id cost parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hasher with explicit cost parameters.
    pub fn with_params(params: Params) -> Self {
        Self { params }
    }

    fn engine(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

fn map_join_error(error: tokio::task::JoinError) -> CredentialHasherError {
    CredentialHasherError::hash(format!("hashing task failed: {error}"))
}

#[async_trait]
impl CredentialHasher for Argon2CredentialHasher {
    async fn hash(&self, password: &str) -> Result<PasswordHash, CredentialHasherError> {
        let engine = self.engine();
        let password = Zeroizing::new(password.to_owned());
        let encoded = tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            engine
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
        })
        .await
        .map_err(map_join_error)?
        .map_err(|error| CredentialHasherError::hash(error.to_string()))?;

        PasswordHash::new(encoded).map_err(|error| CredentialHasherError::hash(error.to_string()))
    }

    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, CredentialHasherError> {
        let engine = self.engine();
        let password = Zeroizing::new(password.to_owned());
        let encoded = hash.as_str().to_owned();
        tokio::task::spawn_blocking(move || {
            let parsed = PhcString::new(&encoded)
                .map_err(|error| CredentialHasherError::corrupt(error.to_string()))?;
            match engine.verify_password(password.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(password_hash::Error::Password) => Ok(false),
                Err(error) => Err(CredentialHasherError::hash(error.to_string())),
            }
        })
        .await
        .map_err(map_join_error)?
    }
}
