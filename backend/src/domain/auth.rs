//! Authentication primitives: credentials, registrations, bearer tokens and
//! the identity they resolve to.
//!
//! Inbound payload parsing stays outside the domain; these constructors
//! validate raw strings before a handler talks to a port or service.

use std::fmt;

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use super::account::{AccountId, AccountValidationError, DisplayName, EmailAddress, Role};
use super::Error;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is trimmed and non-empty. Its shape is not checked: an unknown
///   address simply fails authentication.
/// - `password` is non-empty and retains caller-provided whitespace.
///
/// # Examples
/// ```
/// use grievances::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ana@x.com ", "pw").unwrap();
/// assert_eq!(creds.email(), "ana@x.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used for the account lookup.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Domain error returned when a registration payload is invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationValidationError {
    #[error("{0}")]
    Name(AccountValidationError),
    #[error("{0}")]
    Email(AccountValidationError),
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("role must be student or admin")]
    UnknownRole,
}

impl RegistrationValidationError {
    /// Request field the failure refers to.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Email(_) => "email",
            Self::EmptyPassword => "password",
            Self::UnknownRole => "role",
        }
    }

    /// Stable machine-readable failure code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Name(AccountValidationError::DisplayNameTooLong { .. }) => "name_too_long",
            Self::Name(_) => "empty_name",
            Self::Email(AccountValidationError::EmptyEmail) => "empty_email",
            Self::Email(_) => "malformed_email",
            Self::EmptyPassword => "empty_password",
            Self::UnknownRole => "unknown_role",
        }
    }
}

/// Validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    name: DisplayName,
    email: EmailAddress,
    password: Zeroizing<String>,
    role: Role,
}

impl Registration {
    /// Validate raw registration inputs. An absent role means student.
    pub fn try_from_parts(
        name: &str,
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<Self, RegistrationValidationError> {
        let name = DisplayName::new(name).map_err(RegistrationValidationError::Name)?;
        let email = EmailAddress::new(email).map_err(RegistrationValidationError::Email)?;
        if password.is_empty() {
            return Err(RegistrationValidationError::EmptyPassword);
        }
        let role = match role {
            None => Role::default(),
            Some(raw) => raw
                .parse::<Role>()
                .map_err(|_| RegistrationValidationError::UnknownRole)?,
        };
        Ok(Self {
            name,
            email,
            password: Zeroizing::new(password.to_owned()),
            role,
        })
    }

    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

/// Opaque signed bearer credential.
///
/// The token text is redacted from `Debug` output so it never lands in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wrap raw token text; blank input yields `None`.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    /// Token text as presented in the `Authorization` header.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(..)")
    }
}

/// Claims carried inside a bearer credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub account_id: AccountId,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TokenGrant {
    /// Whether the grant is no longer valid at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Authenticated caller derived from a verified bearer credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub account_id: AccountId,
    pub role: Role,
}

impl Identity {
    /// Fail with `Forbidden` unless the identity holds `role`.
    ///
    /// # Examples
    /// ```
    /// use grievances::domain::{AccountId, ErrorCode, Identity, Role};
    ///
    /// let student = Identity { account_id: AccountId::random(), role: Role::Student };
    /// let err = student.require_role(Role::Admin).unwrap_err();
    /// assert_eq!(err.code(), ErrorCode::Forbidden);
    /// ```
    pub fn require_role(&self, role: Role) -> Result<(), Error> {
        if self.role == role {
            Ok(())
        } else {
            Err(Error::forbidden(format!("{role} role required")))
        }
    }
}

impl From<&TokenGrant> for Identity {
    fn from(grant: &TokenGrant) -> Self {
        Self {
            account_id: grant.account_id,
            role: grant.role,
        }
    }
}
