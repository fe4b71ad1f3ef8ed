//! Port for signing and verifying bearer credentials.
//!
//! The codec owns signature handling only. Expiry is judged by the domain
//! against its injected clock so tests can move time deterministically.

use crate::domain::{BearerToken, TokenGrant};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token codec adapters.
    pub enum TokenCodecError {
        /// The token could not be signed.
        Encode { message: String } => "token encoding failed: {message}",
        /// The token is malformed or its signature does not verify.
        Invalid { message: String } => "token rejected: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait TokenCodec: Send + Sync {
    /// Sign a grant into a bearer credential.
    fn issue(&self, grant: &TokenGrant) -> Result<BearerToken, TokenCodecError>;

    /// Verify the signature and decode the embedded grant.
    fn decode(&self, token: &BearerToken) -> Result<TokenGrant, TokenCodecError>;
}
