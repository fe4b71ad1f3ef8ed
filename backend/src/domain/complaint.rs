//! Complaint data model and triage status.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::{AccountId, DisplayName};

/// Validation errors returned by complaint value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComplaintValidationError {
    #[error("complaint id must be a valid UUID")]
    InvalidId,
    #[error("complaint text must not be empty")]
    EmptyBody,
    #[error("category must not be empty")]
    EmptyCategory,
    #[error("status must be one of pending, resolved, rejected")]
    UnknownStatus,
}

/// Stable complaint identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ComplaintId(Uuid);

impl ComplaintId {
    /// Parse an identifier from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ComplaintValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| ComplaintValidationError::InvalidId)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ComplaintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ComplaintId> for String {
    fn from(value: ComplaintId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for ComplaintId {
    type Error = ComplaintValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Triage state of a complaint.
///
/// Transitions are unconstrained: an administrator may move a complaint
/// between any two states, including back to [`ComplaintStatus::Pending`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ComplaintStatus {
    #[default]
    Pending,
    Resolved,
    Rejected,
}

impl ComplaintStatus {
    /// Every recognised status, in display order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Resolved, Self::Rejected];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplaintStatus {
    type Err = ComplaintValidationError;

    /// Exact, case-sensitive match against the stored names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "resolved" => Ok(Self::Resolved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ComplaintValidationError::UnknownStatus),
        }
    }
}

/// Validated submission payload.
///
/// ## Invariants
/// - `body` and `category` are trimmed and non-empty.
/// - A blank `title` is normalised to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintDraft {
    title: Option<String>,
    body: String,
    category: String,
}

impl ComplaintDraft {
    pub fn try_from_parts(
        title: Option<&str>,
        body: &str,
        category: &str,
    ) -> Result<Self, ComplaintValidationError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(ComplaintValidationError::EmptyBody);
        }
        let category = category.trim();
        if category.is_empty() {
            return Err(ComplaintValidationError::EmptyCategory);
        }
        let title = title
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned);
        Ok(Self {
            title,
            body: body.to_owned(),
            category: category.to_owned(),
        })
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn body(&self) -> &str {
        self.body.as_str()
    }

    pub fn category(&self) -> &str {
        self.category.as_str()
    }
}

/// Insert payload handed to the complaint repository.
#[derive(Debug, Clone, PartialEq)]
pub struct NewComplaint {
    pub id: ComplaintId,
    pub author: AccountId,
    pub title: Option<String>,
    pub body: String,
    pub category: String,
    pub sentiment: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl NewComplaint {
    /// Build an insert payload from a validated draft.
    pub fn from_draft(
        author: AccountId,
        draft: ComplaintDraft,
        sentiment: Option<f64>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let ComplaintDraft {
            title,
            body,
            category,
        } = draft;
        Self {
            id: ComplaintId::random(),
            author,
            title,
            body,
            category,
            sentiment,
            created_at,
        }
    }
}

/// Stored complaint.
///
/// ## Invariants
/// - `votes == voted_by.len()`; each account appears at most once.
/// - `votes` never decreases.
#[derive(Debug, Clone, PartialEq)]
pub struct Complaint {
    pub id: ComplaintId,
    pub author: AccountId,
    pub title: Option<String>,
    pub body: String,
    pub category: String,
    pub sentiment: Option<f64>,
    pub votes: u32,
    pub voted_by: Vec<AccountId>,
    pub last_voter: Option<AccountId>,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
}

impl Complaint {
    /// Materialise a freshly inserted complaint: pending, no votes.
    pub fn from_new(new: NewComplaint) -> Self {
        let NewComplaint {
            id,
            author,
            title,
            body,
            category,
            sentiment,
            created_at,
        } = new;
        Self {
            id,
            author,
            title,
            body,
            category,
            sentiment,
            votes: 0,
            voted_by: Vec::new(),
            last_voter: None,
            status: ComplaintStatus::Pending,
            created_at,
        }
    }

    pub fn has_voted(&self, account: &AccountId) -> bool {
        self.voted_by.contains(account)
    }
}

/// Complaint paired with its author's display name.
///
/// `author_name` is `None` when the author account cannot be resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplaintWithAuthor {
    pub complaint: Complaint,
    pub author_name: Option<DisplayName>,
}

/// Order complaints newest first, breaking ties by id for stable output.
pub fn sort_newest_first(complaints: &mut [Complaint]) {
    complaints.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use rstest::rstest;

    #[rstest]
    #[case("pending", Ok(ComplaintStatus::Pending))]
    #[case("resolved", Ok(ComplaintStatus::Resolved))]
    #[case("rejected", Ok(ComplaintStatus::Rejected))]
    #[case("Resolved", Err(ComplaintValidationError::UnknownStatus))]
    #[case("closed", Err(ComplaintValidationError::UnknownStatus))]
    #[case("", Err(ComplaintValidationError::UnknownStatus))]
    fn status_parsing_is_closed(
        #[case] raw: &str,
        #[case] expected: Result<ComplaintStatus, ComplaintValidationError>,
    ) {
        assert_eq!(raw.parse::<ComplaintStatus>(), expected);
    }

    #[rstest]
    fn status_names_round_trip() {
        for status in ComplaintStatus::ALL {
            assert_eq!(status.as_str().parse::<ComplaintStatus>(), Ok(status));
        }
    }

    #[rstest]
    #[case(None, "  ", "WiFi", Err(ComplaintValidationError::EmptyBody))]
    #[case(None, "Wifi down", " ", Err(ComplaintValidationError::EmptyCategory))]
    fn draft_rejects_blank_fields(
        #[case] title: Option<&str>,
        #[case] body: &str,
        #[case] category: &str,
        #[case] expected: Result<ComplaintDraft, ComplaintValidationError>,
    ) {
        assert_eq!(ComplaintDraft::try_from_parts(title, body, category), expected);
    }

    #[rstest]
    fn draft_normalises_blank_title() {
        let draft = ComplaintDraft::try_from_parts(Some("  "), " Wifi down ", "WiFi")
            .expect("valid draft");
        assert_eq!(draft.title(), None);
        assert_eq!(draft.body(), "Wifi down");
        assert_eq!(draft.category(), "WiFi");
    }

    #[rstest]
    fn new_complaints_start_pending_without_votes() {
        let draft = ComplaintDraft::try_from_parts(Some("Router"), "Wifi down", "WiFi")
            .expect("valid draft");
        let complaint = Complaint::from_new(NewComplaint::from_draft(
            AccountId::random(),
            draft,
            Some(-0.4),
            Utc::now(),
        ));
        assert_eq!(complaint.status, ComplaintStatus::Pending);
        assert_eq!(complaint.votes, 0);
        assert!(complaint.voted_by.is_empty());
        assert!(complaint.last_voter.is_none());
    }

    #[rstest]
    fn sort_newest_first_orders_by_timestamp() {
        let now = Utc::now();
        let make = |offset: i64| {
            let draft =
                ComplaintDraft::try_from_parts(None, "text", "Mess").expect("valid draft");
            Complaint::from_new(NewComplaint::from_draft(
                AccountId::random(),
                draft,
                None,
                now - TimeDelta::minutes(offset),
            ))
        };
        let mut complaints = vec![make(10), make(0), make(5)];
        sort_newest_first(&mut complaints);
        let order: Vec<_> = complaints.iter().map(|c| c.created_at).collect();
        assert_eq!(
            order,
            vec![
                now,
                now - TimeDelta::minutes(5),
                now - TimeDelta::minutes(10)
            ]
        );
    }
}
