//! Port abstraction for complaint store adapters and their errors.

use async_trait::async_trait;

use crate::domain::{AccountId, Complaint, ComplaintId, ComplaintStatus, NewComplaint};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by complaint repository adapters.
    pub enum ComplaintRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "complaint repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "complaint repository query failed: {message}",
        /// No complaint has the requested id.
        Missing { id: String } => "complaint not found: {id}",
        /// The voter already voted on this complaint.
        DuplicateVote { voter: String } => "account {voter} already voted",
    }
}

/// Storage for complaints and their voter ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ComplaintRepository: Send + Sync {
    /// Persist a new complaint with status pending and no votes.
    async fn insert(&self, complaint: &NewComplaint) -> Result<Complaint, ComplaintRepositoryError>;

    /// Every stored complaint, newest first.
    async fn list(&self) -> Result<Vec<Complaint>, ComplaintRepositoryError>;

    /// Fetch a complaint by identifier.
    async fn find_by_id(
        &self,
        id: &ComplaintId,
    ) -> Result<Option<Complaint>, ComplaintRepositoryError>;

    /// Add `voter` to the voter set and increment the count by one.
    ///
    /// Must be atomic: concurrent calls never lose an increment, and a voter
    /// already in the set yields [`ComplaintRepositoryError::DuplicateVote`]
    /// without changing the count. A missing complaint yields
    /// [`ComplaintRepositoryError::Missing`].
    async fn record_vote(
        &self,
        id: &ComplaintId,
        voter: &AccountId,
    ) -> Result<Complaint, ComplaintRepositoryError>;

    /// Overwrite the status. A missing complaint yields
    /// [`ComplaintRepositoryError::Missing`].
    async fn set_status(
        &self,
        id: &ComplaintId,
        status: ComplaintStatus,
    ) -> Result<Complaint, ComplaintRepositoryError>;

    /// Attach a sentiment score produced after creation.
    async fn set_sentiment(
        &self,
        id: &ComplaintId,
        sentiment: f64,
    ) -> Result<(), ComplaintRepositoryError>;
}
