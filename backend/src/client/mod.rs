//! Command-line client: typed API access plus a cached session.
//!
//! The dashboard and "my complaints" views are recomputed locally from the
//! fetched lists, matching what the server itself reports.

mod api;
mod session;

pub use api::{ApiClient, ApiClientError, DEFAULT_CLIENT_TIMEOUT};
pub use session::{Session, SessionStore, SessionStoreError};

use crate::domain::{AccountId, Complaint, DashboardSummary};
use crate::inbound::http::complaints::ComplaintResponse;

/// Complaints authored by `account`, preserving order.
pub fn authored_by(complaints: &[ComplaintResponse], account: &AccountId) -> Vec<ComplaintResponse> {
    complaints
        .iter()
        .filter(|complaint| complaint.author == *account)
        .cloned()
        .collect()
}

/// Dashboard totals over a fetched list.
pub fn dashboard(complaints: &[ComplaintResponse]) -> DashboardSummary {
    let complaints: Vec<Complaint> = complaints.iter().cloned().map(Complaint::from).collect();
    DashboardSummary::from_complaints(&complaints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ComplaintId, ComplaintStatus};
    use crate::test_support::fixed_now;
    use rstest::rstest;

    fn response(author: AccountId, category: &str, status: ComplaintStatus) -> ComplaintResponse {
        ComplaintResponse {
            id: ComplaintId::random(),
            author,
            author_name: None,
            title: None,
            body: "Wifi down".to_owned(),
            category: category.to_owned(),
            sentiment: None,
            votes: 0,
            voted_by: Vec::new(),
            last_voter: None,
            status,
            created_at: fixed_now(),
        }
    }

    #[rstest]
    fn mine_keeps_only_own_complaints() {
        let ana = AccountId::random();
        let ben = AccountId::random();
        let list = vec![
            response(ana, "WiFi", ComplaintStatus::Pending),
            response(ben, "Mess", ComplaintStatus::Pending),
            response(ana, "Mess", ComplaintStatus::Resolved),
        ];

        let mine = authored_by(&list, &ana);
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|complaint| complaint.author == ana));
    }

    #[rstest]
    fn dashboard_matches_status_and_category_totals() {
        let author = AccountId::random();
        let list = vec![
            response(author, "WiFi", ComplaintStatus::Pending),
            response(author, "WiFi", ComplaintStatus::Rejected),
            response(author, "Mess", ComplaintStatus::Resolved),
        ];

        let summary = dashboard(&list);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.resolved, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.by_category.get("WiFi"), Some(&2));
        assert_eq!(summary.by_category.get("Mess"), Some(&1));
    }
}
