//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper produces an `invalid_request` error whose `details` object
//! names the offending `field` and a machine-readable `code`.

use serde_json::json;

use crate::domain::{
    ComplaintId, ComplaintStatus, ComplaintValidationError, Error, LoginValidationError,
    RegistrationValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    EmptyField,
    InvalidUuid,
    UnknownStatus,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::EmptyField => "empty_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::UnknownStatus => "unknown_status",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

fn field_error(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code,
    }))
}

fn field_error_with_value(field: FieldName, code: ErrorCode, message: String, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn empty_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    field_error(
        field,
        ErrorCode::EmptyField.as_str(),
        format!("{field} must not be empty"),
    )
}

pub(crate) fn parse_complaint_id(value: &str, field: FieldName) -> Result<ComplaintId, Error> {
    ComplaintId::new(value).map_err(|_| {
        field_error_with_value(
            field,
            ErrorCode::InvalidUuid,
            format!("{} must be a valid UUID", field.as_str()),
            value,
        )
    })
}

pub(crate) fn parse_status(value: &str, field: FieldName) -> Result<ComplaintStatus, Error> {
    value.parse::<ComplaintStatus>().map_err(|_| {
        let allowed: Vec<&str> = ComplaintStatus::ALL.iter().map(|s| s.as_str()).collect();
        Error::invalid_request(format!(
            "{} must be one of: {}",
            field.as_str(),
            allowed.join(", ")
        ))
        .with_details(json!({
            "field": field.as_str(),
            "value": value,
            "code": ErrorCode::UnknownStatus.as_str(),
        }))
    })
}

pub(crate) fn map_registration_error(error: &RegistrationValidationError) -> Error {
    field_error(error.field(), error.code(), error.to_string())
}

pub(crate) fn map_login_error(error: &LoginValidationError) -> Error {
    match error {
        LoginValidationError::EmptyEmail => empty_field_error(FieldName::new("email")),
        LoginValidationError::EmptyPassword => empty_field_error(FieldName::new("password")),
    }
}

pub(crate) fn map_draft_error(error: &ComplaintValidationError) -> Error {
    match error {
        ComplaintValidationError::EmptyBody => empty_field_error(FieldName::new("body")),
        ComplaintValidationError::EmptyCategory => empty_field_error(FieldName::new("category")),
        other => Error::invalid_request(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode as DomainCode;
    use rstest::rstest;

    #[rstest]
    #[case("pending", ComplaintStatus::Pending)]
    #[case("resolved", ComplaintStatus::Resolved)]
    #[case("rejected", ComplaintStatus::Rejected)]
    fn parses_known_statuses(#[case] raw: &str, #[case] expected: ComplaintStatus) {
        assert_eq!(parse_status(raw, FieldName::new("status")).ok(), Some(expected));
    }

    #[rstest]
    #[case("archived")]
    #[case("Resolved")]
    #[case("")]
    fn rejects_unknown_statuses(#[case] raw: &str) {
        let error = parse_status(raw, FieldName::new("status")).expect_err("unknown status");
        assert_eq!(error.code(), DomainCode::InvalidRequest);
        let details = error.details().expect("details");
        assert_eq!(details["code"], "unknown_status");
        assert_eq!(details["value"], raw);
    }

    #[test]
    fn invalid_complaint_ids_report_the_value() {
        let error = parse_complaint_id("nope", FieldName::new("id")).expect_err("invalid id");
        let details = error.details().expect("details");
        assert_eq!(details["field"], "id");
        assert_eq!(details["code"], "invalid_uuid");
        assert_eq!(details["value"], "nope");
    }

    #[rstest]
    #[case(LoginValidationError::EmptyEmail, "email")]
    #[case(LoginValidationError::EmptyPassword, "password")]
    fn login_errors_name_the_field(#[case] error: LoginValidationError, #[case] field: &str) {
        let mapped = map_login_error(&error);
        let details = mapped.details().expect("details");
        assert_eq!(details["field"], field);
        assert_eq!(details["code"], "empty_field");
    }

    #[test]
    fn registration_errors_keep_their_codes() {
        let error = RegistrationValidationError::EmptyPassword;
        let mapped = map_registration_error(&error);
        let details = mapped.details().expect("details");
        assert_eq!(details["field"], "password");
        assert_eq!(details["code"], "empty_password");
    }
}
