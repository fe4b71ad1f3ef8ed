//! HS256 JSON Web Token adapter for the `TokenCodec` port.
//!
//! Claims: `sub` (account id), `role`, `iat`, `exp` in Unix seconds. The
//! signature is checked here; `exp` is decoded but judged by the domain.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{TokenCodec, TokenCodecError};
use crate::domain::{AccountId, BearerToken, Role, TokenGrant};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: Role,
    iat: i64,
    exp: i64,
}

/// Bearer credential codec signing with a shared HMAC secret.
#[derive(Clone)]
pub struct JwtTokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtTokenCodec {
    /// Build a codec from the signing secret.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

fn from_unix(seconds: i64, claim: &str) -> Result<DateTime<Utc>, TokenCodecError> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| TokenCodecError::invalid(format!("{claim} is out of range")))
}

impl TokenCodec for JwtTokenCodec {
    fn issue(&self, grant: &TokenGrant) -> Result<BearerToken, TokenCodecError> {
        let claims = Claims {
            sub: grant.account_id.to_string(),
            role: grant.role,
            iat: grant.issued_at.timestamp(),
            exp: grant.expires_at.timestamp(),
        };
        let encoded = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|error| TokenCodecError::encode(error.to_string()))?;
        BearerToken::new(encoded).ok_or_else(|| TokenCodecError::encode("empty token"))
    }

    fn decode(&self, token: &BearerToken) -> Result<TokenGrant, TokenCodecError> {
        let data = decode::<Claims>(token.as_str(), &self.decoding, &self.validation)
            .map_err(|error| TokenCodecError::invalid(error.to_string()))?;
        let Claims {
            sub,
            role,
            iat,
            exp,
        } = data.claims;
        let account_id =
            AccountId::new(&sub).map_err(|error| TokenCodecError::invalid(error.to_string()))?;
        Ok(TokenGrant {
            account_id,
            role,
            issued_at: from_unix(iat, "iat")?,
            expires_at: from_unix(exp, "exp")?,
        })
    }
}
