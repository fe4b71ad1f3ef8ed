//! Driving ports for the complaint service.

use async_trait::async_trait;

use crate::domain::{
    Complaint, ComplaintDraft, ComplaintId, ComplaintStatus, ComplaintWithAuthor,
    DashboardSummary, Error, Identity,
};

/// Complaint mutations.
#[async_trait]
pub trait ComplaintsCommand: Send + Sync {
    /// Submit a complaint on behalf of `author`. The stored complaint is
    /// always pending with zero votes.
    async fn create(&self, author: &Identity, draft: ComplaintDraft) -> Result<Complaint, Error>;

    /// Add one vote from `voter`. Fails with `NotFound` for unknown ids and
    /// `Conflict` when the voter already voted.
    async fn vote(&self, voter: &Identity, id: ComplaintId) -> Result<Complaint, Error>;

    /// Overwrite the status. Admin only.
    async fn set_status(
        &self,
        caller: &Identity,
        id: ComplaintId,
        status: ComplaintStatus,
    ) -> Result<Complaint, Error>;
}

/// Complaint reads.
#[async_trait]
pub trait ComplaintsQuery: Send + Sync {
    /// Public feed: every complaint, newest first, no author resolution.
    async fn list_all(&self) -> Result<Vec<Complaint>, Error>;

    /// Every complaint with the author name resolved, newest first.
    /// Narrowing to the caller's own complaints is left to the caller.
    async fn list_with_authors(&self, caller: &Identity) -> Result<Vec<ComplaintWithAuthor>, Error>;

    async fn get(&self, id: ComplaintId) -> Result<Complaint, Error>;

    /// Dashboard totals over every complaint. Admin only.
    async fn summary(&self, caller: &Identity) -> Result<DashboardSummary, Error>;
}
