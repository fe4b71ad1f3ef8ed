//! Account directory data model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum allowed length for a display name, in characters.
pub const DISPLAY_NAME_MAX: usize = 64;

/// Validation errors returned by account value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountValidationError {
    #[error("account id must be a valid UUID")]
    InvalidId,
    #[error("name must not be empty")]
    EmptyDisplayName,
    #[error("name must be at most {max} characters")]
    DisplayNameTooLong { max: usize },
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email must contain a single @ with text on both sides")]
    MalformedEmail,
    #[error("role must be student or admin")]
    UnknownRole,
    #[error("password hash must not be empty")]
    EmptyPasswordHash,
}

/// Stable account identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(Uuid);

impl AccountId {
    /// Parse an identifier from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, AccountValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(AccountValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| AccountValidationError::InvalidId)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<AccountId> for String {
    fn from(value: AccountId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for AccountId {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Human readable name shown next to complaints.
///
/// Stored trimmed; must be non-empty and at most [`DISPLAY_NAME_MAX`]
/// characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a display name.
    pub fn new(value: impl Into<String>) -> Result<Self, AccountValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AccountValidationError::EmptyDisplayName);
        }
        if trimmed.chars().count() > DISPLAY_NAME_MAX {
            return Err(AccountValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Login email address.
///
/// Surrounding whitespace is trimmed; comparisons are case-sensitive, so
/// `Ana@x.com` and `ana@x.com` are distinct accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an email address.
    pub fn new(value: impl Into<String>) -> Result<Self, AccountValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AccountValidationError::EmptyEmail);
        }
        let mut parts = trimmed.split('@');
        let well_formed = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty()
        );
        if !well_formed || trimmed.chars().any(char::is_whitespace) {
            return Err(AccountValidationError::MalformedEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Account role used for authorisation decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Admin,
}

impl Role {
    /// Stable lowercase name used on the wire and in storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AccountValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "admin" => Ok(Self::Admin),
            _ => Err(AccountValidationError::UnknownRole),
        }
    }
}

/// Salted one-way password hash in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by a credential hasher.
    pub fn new(encoded: impl Into<String>) -> Result<Self, AccountValidationError> {
        let encoded = encoded.into();
        if encoded.trim().is_empty() {
            return Err(AccountValidationError::EmptyPasswordHash);
        }
        Ok(Self(encoded))
    }

    /// Access the encoded hash.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// Stored account record.
///
/// ## Invariants
/// - `email` is unique across the directory.
/// - `password_hash` never leaves the domain; adapters expose
///   [`AccountSummary`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub name: DisplayName,
    pub email: EmailAddress,
    pub password_hash: PasswordHash,
    pub role: Role,
}

impl Account {
    /// Public projection without the password hash.
    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Public account summary returned by registration and login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: AccountId,
    pub name: DisplayName,
    pub email: EmailAddress,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ana@x.com", true)]
    #[case("  ana@x.com  ", true)]
    #[case("", false)]
    #[case("ana", false)]
    #[case("@x.com", false)]
    #[case("ana@", false)]
    #[case("a@b@c", false)]
    #[case("an a@x.com", false)]
    fn email_validation(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(EmailAddress::new(raw).is_ok(), valid, "{raw:?}");
    }

    #[rstest]
    fn email_is_trimmed_but_case_preserved() {
        let email = EmailAddress::new("  Ana@X.com ").expect("valid email");
        assert_eq!(email.as_ref(), "Ana@X.com");
    }

    #[rstest]
    #[case("", Err(AccountValidationError::EmptyDisplayName))]
    #[case("   ", Err(AccountValidationError::EmptyDisplayName))]
    #[case(" Ana ", Ok("Ana"))]
    fn display_name_validation(
        #[case] raw: &str,
        #[case] expected: Result<&str, AccountValidationError>,
    ) {
        let result = DisplayName::new(raw).map(String::from);
        assert_eq!(result, expected.map(str::to_owned));
    }

    #[rstest]
    fn display_name_rejects_overlong_values() {
        let raw = "a".repeat(DISPLAY_NAME_MAX + 1);
        assert_eq!(
            DisplayName::new(raw),
            Err(AccountValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX
            })
        );
    }

    #[rstest]
    #[case("student", Ok(Role::Student))]
    #[case("admin", Ok(Role::Admin))]
    #[case("Admin", Err(AccountValidationError::UnknownRole))]
    #[case("superuser", Err(AccountValidationError::UnknownRole))]
    fn role_parsing(#[case] raw: &str, #[case] expected: Result<Role, AccountValidationError>) {
        assert_eq!(raw.parse::<Role>(), expected);
    }

    #[rstest]
    fn role_defaults_to_student() {
        assert_eq!(Role::default(), Role::Student);
    }

    #[rstest]
    fn summary_omits_password_hash() {
        let account = Account {
            id: AccountId::random(),
            name: DisplayName::new("Ana").expect("name"),
            email: EmailAddress::new("ana@x.com").expect("email"),
            password_hash: PasswordHash::new("$argon2id$stub").expect("hash"),
            role: Role::Student,
        };
        let value = serde_json::to_value(account.summary()).expect("serialise");
        assert_eq!(value["email"], "ana@x.com");
        assert_eq!(value["role"], "student");
        assert!(value.get("passwordHash").is_none());
    }

    #[rstest]
    fn password_hash_debug_is_redacted() {
        let hash = PasswordHash::new("$argon2id$secret").expect("hash");
        assert_eq!(format!("{hash:?}"), "PasswordHash(..)");
    }
}
