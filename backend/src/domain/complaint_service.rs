//! Complaint lifecycle service.
//!
//! Implements complaint submission, listing, voting, and status moderation
//! over the complaint and account repositories. Creation is the only
//! operation that leaves the process: the body text is scored by the
//! sentiment scorer under a time bound, and a failed score is retried once in
//! a detached task.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, ComplaintRepository, ComplaintRepositoryError,
    ComplaintsCommand, ComplaintsQuery, SentimentScorer, SentimentScorerError,
};
use crate::domain::{
    AccountId, Complaint, ComplaintDraft, ComplaintId, ComplaintStatus, ComplaintWithAuthor,
    DashboardSummary, DisplayName, Error, Identity, NewComplaint, Role, TraceId,
};

/// Upper bound on the synchronous sentiment call unless configured otherwise.
pub const DEFAULT_SCORING_TIMEOUT: Duration = Duration::from_secs(3);

/// Complaint service implementing the complaint driving ports.
#[derive(Clone)]
pub struct ComplaintService<C, A, S> {
    complaints: Arc<C>,
    accounts: Arc<A>,
    scorer: Arc<S>,
    clock: Arc<dyn Clock + Send + Sync>,
    scoring_timeout: Duration,
}

impl<C, A, S> ComplaintService<C, A, S> {
    pub fn new(
        complaints: Arc<C>,
        accounts: Arc<A>,
        scorer: Arc<S>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            complaints,
            accounts,
            scorer,
            clock,
            scoring_timeout: DEFAULT_SCORING_TIMEOUT,
        }
    }

    /// Override the bound on the synchronous sentiment call.
    #[must_use]
    pub fn with_scoring_timeout(mut self, scoring_timeout: Duration) -> Self {
        self.scoring_timeout = scoring_timeout;
        self
    }
}

fn map_complaint_error(error: ComplaintRepositoryError) -> Error {
    match error {
        ComplaintRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("complaint repository unavailable: {message}"))
        }
        ComplaintRepositoryError::Query { message } => {
            Error::internal(format!("complaint repository error: {message}"))
        }
        ComplaintRepositoryError::Missing { .. } => complaint_not_found(),
        ComplaintRepositoryError::DuplicateVote { .. } => {
            Error::conflict("already voted").with_details(json!({
                "code": "duplicate_vote",
            }))
        }
    }
}

fn map_account_error(error: AccountRepositoryError) -> Error {
    match error {
        AccountRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("account repository unavailable: {message}"))
        }
        other => Error::internal(format!("account repository error: {other}")),
    }
}

fn complaint_not_found() -> Error {
    Error::not_found("complaint not found")
}

/// Distinct authors in first-seen order.
fn authors_of(complaints: &[Complaint]) -> Vec<AccountId> {
    let mut seen = Vec::new();
    for complaint in complaints {
        if !seen.contains(&complaint.author) {
            seen.push(complaint.author);
        }
    }
    seen
}

impl<C, A, S> ComplaintService<C, A, S>
where
    C: ComplaintRepository + 'static,
    A: AccountRepository,
    S: SentimentScorer + 'static,
{
    async fn score_bounded(&self, text: &str) -> Result<f64, SentimentScorerError> {
        match tokio::time::timeout(self.scoring_timeout, self.scorer.score(text)).await {
            Ok(result) => result,
            Err(_) => Err(SentimentScorerError::timeout(format!(
                "no answer within {} ms",
                self.scoring_timeout.as_millis()
            ))),
        }
    }

    /// Retry scoring once in a detached task and attach the score on success.
    fn spawn_backfill(&self, id: ComplaintId, text: String) {
        let complaints = Arc::clone(&self.complaints);
        let scorer = Arc::clone(&self.scorer);
        let trace_id = TraceId::current().unwrap_or_else(TraceId::generate);
        tokio::spawn(TraceId::scope(trace_id, async move {
            let sentiment = match scorer.score(&text).await {
                Ok(sentiment) => sentiment,
                Err(error) => {
                    warn!(complaint_id = %id, %error, "sentiment backfill failed");
                    return;
                }
            };
            match complaints.set_sentiment(&id, sentiment).await {
                Ok(()) => debug!(complaint_id = %id, sentiment, "sentiment backfilled"),
                Err(error) => {
                    warn!(complaint_id = %id, %error, "failed to store backfilled sentiment");
                }
            }
        }));
    }

    async fn fetch(&self, id: &ComplaintId) -> Result<Complaint, Error> {
        self.complaints
            .find_by_id(id)
            .await
            .map_err(map_complaint_error)?
            .ok_or_else(complaint_not_found)
    }

    async fn all(&self) -> Result<Vec<Complaint>, Error> {
        self.complaints.list().await.map_err(map_complaint_error)
    }
}

#[async_trait]
impl<C, A, S> ComplaintsCommand for ComplaintService<C, A, S>
where
    C: ComplaintRepository + 'static,
    A: AccountRepository,
    S: SentimentScorer + 'static,
{
    async fn create(&self, author: &Identity, draft: ComplaintDraft) -> Result<Complaint, Error> {
        let sentiment = match self.score_bounded(draft.body()).await {
            Ok(score) => Some(score),
            Err(error) => {
                warn!(%error, "sentiment scoring failed; storing complaint without a score");
                None
            }
        };
        let text = draft.body().to_owned();
        let new = NewComplaint::from_draft(author.account_id, draft, sentiment, self.clock.utc());
        let complaint = self
            .complaints
            .insert(&new)
            .await
            .map_err(map_complaint_error)?;

        info!(
            complaint_id = %complaint.id,
            author = %complaint.author,
            category = %complaint.category,
            "complaint created"
        );
        if complaint.sentiment.is_none() {
            self.spawn_backfill(complaint.id, text);
        }
        Ok(complaint)
    }

    async fn vote(&self, voter: &Identity, id: ComplaintId) -> Result<Complaint, Error> {
        let complaint = self
            .complaints
            .record_vote(&id, &voter.account_id)
            .await
            .map_err(map_complaint_error)?;
        debug!(complaint_id = %id, voter = %voter.account_id, votes = complaint.votes, "vote recorded");
        Ok(complaint)
    }

    async fn set_status(
        &self,
        caller: &Identity,
        id: ComplaintId,
        status: ComplaintStatus,
    ) -> Result<Complaint, Error> {
        caller.require_role(Role::Admin)?;
        let complaint = self
            .complaints
            .set_status(&id, status)
            .await
            .map_err(map_complaint_error)?;
        info!(complaint_id = %id, %status, admin = %caller.account_id, "complaint status updated");
        Ok(complaint)
    }
}

#[async_trait]
impl<C, A, S> ComplaintsQuery for ComplaintService<C, A, S>
where
    C: ComplaintRepository + 'static,
    A: AccountRepository,
    S: SentimentScorer + 'static,
{
    async fn list_all(&self) -> Result<Vec<Complaint>, Error> {
        self.all().await
    }

    async fn list_with_authors(
        &self,
        _caller: &Identity,
    ) -> Result<Vec<ComplaintWithAuthor>, Error> {
        let complaints = self.all().await?;
        let names: HashMap<AccountId, DisplayName> = self
            .accounts
            .display_names(&authors_of(&complaints))
            .await
            .map_err(map_account_error)?;
        Ok(complaints
            .into_iter()
            .map(|complaint| {
                let author_name = names.get(&complaint.author).cloned();
                ComplaintWithAuthor {
                    complaint,
                    author_name,
                }
            })
            .collect())
    }

    async fn get(&self, id: ComplaintId) -> Result<Complaint, Error> {
        self.fetch(&id).await
    }

    async fn summary(&self, caller: &Identity) -> Result<DashboardSummary, Error> {
        caller.require_role(Role::Admin)?;
        let complaints = self.all().await?;
        Ok(DashboardSummary::from_complaints(&complaints))
    }
}

#[cfg(test)]
#[path = "complaint_service_tests.rs"]
mod tests;
