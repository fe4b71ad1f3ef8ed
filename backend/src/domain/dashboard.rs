//! Dashboard aggregation over a complaint list.
//!
//! A pure projection with no stored state; recomputed on every fetch by both
//! the admin endpoint and the command-line client.

use std::collections::BTreeMap;

use super::complaint::{Complaint, ComplaintStatus};

/// Totals shown on the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    pub total: usize,
    pub pending: usize,
    pub resolved: usize,
    pub rejected: usize,
    /// Counts keyed by exact category text, ordered by name.
    pub by_category: BTreeMap<String, usize>,
}

impl DashboardSummary {
    /// Tally `(status, category)` pairs.
    ///
    /// # Examples
    /// ```
    /// use grievances::domain::{ComplaintStatus, DashboardSummary};
    ///
    /// let summary = DashboardSummary::tally([
    ///     (ComplaintStatus::Pending, "WiFi"),
    ///     (ComplaintStatus::Resolved, "WiFi"),
    ///     (ComplaintStatus::Pending, "wifi"),
    /// ]);
    /// assert_eq!(summary.total, 3);
    /// assert_eq!(summary.pending, 2);
    /// assert_eq!(summary.by_category.get("WiFi"), Some(&2));
    /// assert_eq!(summary.by_category.get("wifi"), Some(&1));
    /// ```
    pub fn tally<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = (ComplaintStatus, &'a str)>,
    {
        items
            .into_iter()
            .fold(Self::default(), |mut summary, (status, category)| {
                summary.total += 1;
                match status {
                    ComplaintStatus::Pending => summary.pending += 1,
                    ComplaintStatus::Resolved => summary.resolved += 1,
                    ComplaintStatus::Rejected => summary.rejected += 1,
                }
                *summary.by_category.entry(category.to_owned()).or_default() += 1;
                summary
            })
    }

    /// Aggregate a list of stored complaints.
    pub fn from_complaints(complaints: &[Complaint]) -> Self {
        Self::tally(complaints.iter().map(|c| (c.status, c.category.as_str())))
    }

    /// Count for a single status.
    pub fn count_for(&self, status: ComplaintStatus) -> usize {
        match status {
            ComplaintStatus::Pending => self.pending,
            ComplaintStatus::Resolved => self.resolved,
            ComplaintStatus::Rejected => self.rejected,
        }
    }
}
