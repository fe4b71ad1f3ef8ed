//! Mutex-guarded complaint store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{ComplaintRepository, ComplaintRepositoryError};
use crate::domain::{
    AccountId, Complaint, ComplaintId, ComplaintStatus, NewComplaint, sort_newest_first,
};

use super::poisoned;

/// Complaint repository holding every complaint in process memory.
#[derive(Debug, Default)]
pub struct InMemoryComplaintRepository {
    complaints: Mutex<HashMap<ComplaintId, Complaint>>,
}

impl InMemoryComplaintRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_complaints<T>(
        &self,
        f: impl FnOnce(&mut HashMap<ComplaintId, Complaint>) -> Result<T, ComplaintRepositoryError>,
    ) -> Result<T, ComplaintRepositoryError> {
        let mut guard = self
            .complaints
            .lock()
            .map_err(|_| ComplaintRepositoryError::query(poisoned("complaint store")))?;
        f(&mut guard)
    }

    fn update(
        &self,
        id: &ComplaintId,
        f: impl FnOnce(&mut Complaint) -> Result<(), ComplaintRepositoryError>,
    ) -> Result<Complaint, ComplaintRepositoryError> {
        self.with_complaints(|complaints| {
            let complaint = complaints
                .get_mut(id)
                .ok_or_else(|| ComplaintRepositoryError::missing(id.to_string()))?;
            f(complaint)?;
            Ok(complaint.clone())
        })
    }
}

#[async_trait]
impl ComplaintRepository for InMemoryComplaintRepository {
    async fn insert(&self, complaint: &NewComplaint) -> Result<Complaint, ComplaintRepositoryError> {
        let stored = Complaint::from_new(complaint.clone());
        self.with_complaints(|complaints| {
            complaints.insert(stored.id, stored.clone());
            Ok(stored)
        })
    }

    async fn list(&self) -> Result<Vec<Complaint>, ComplaintRepositoryError> {
        let mut all: Vec<Complaint> =
            self.with_complaints(|complaints| Ok(complaints.values().cloned().collect()))?;
        sort_newest_first(&mut all);
        Ok(all)
    }

    async fn find_by_id(
        &self,
        id: &ComplaintId,
    ) -> Result<Option<Complaint>, ComplaintRepositoryError> {
        self.with_complaints(|complaints| Ok(complaints.get(id).cloned()))
    }

    async fn record_vote(
        &self,
        id: &ComplaintId,
        voter: &AccountId,
    ) -> Result<Complaint, ComplaintRepositoryError> {
        self.update(id, |complaint| {
            if complaint.has_voted(voter) {
                return Err(ComplaintRepositoryError::duplicate_vote(voter.to_string()));
            }
            complaint.voted_by.push(*voter);
            complaint.votes = complaint.votes.saturating_add(1);
            complaint.last_voter = Some(*voter);
            Ok(())
        })
    }

    async fn set_status(
        &self,
        id: &ComplaintId,
        status: ComplaintStatus,
    ) -> Result<Complaint, ComplaintRepositoryError> {
        self.update(id, |complaint| {
            complaint.status = status;
            Ok(())
        })
    }

    async fn set_sentiment(
        &self,
        id: &ComplaintId,
        sentiment: f64,
    ) -> Result<(), ComplaintRepositoryError> {
        self.update(id, |complaint| {
            complaint.sentiment = Some(sentiment);
            Ok(())
        })
        .map(drop)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};
    use rstest::rstest;

    fn new_complaint(minutes_ago: i64) -> NewComplaint {
        let base = Utc
            .with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
            .single()
            .expect("timestamp");
        NewComplaint {
            id: ComplaintId::random(),
            author: AccountId::random(),
            title: None,
            body: "Wifi down in block C".to_owned(),
            category: "WiFi".to_owned(),
            sentiment: None,
            created_at: base - TimeDelta::minutes(minutes_ago),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn list_returns_newest_first() {
        let repo = InMemoryComplaintRepository::new();
        let older = repo.insert(&new_complaint(10)).await.expect("insert");
        let newer = repo.insert(&new_complaint(1)).await.expect("insert");

        let ids: Vec<_> = repo.list().await.expect("list").into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[rstest]
    #[tokio::test]
    async fn repeat_vote_is_rejected_without_changing_the_count() {
        let repo = InMemoryComplaintRepository::new();
        let complaint = repo.insert(&new_complaint(0)).await.expect("insert");
        let voter = AccountId::random();

        let voted = repo.record_vote(&complaint.id, &voter).await.expect("vote");
        assert_eq!(voted.votes, 1);
        assert_eq!(voted.last_voter, Some(voter));

        let err = repo
            .record_vote(&complaint.id, &voter)
            .await
            .expect_err("repeat vote");
        assert!(matches!(err, ComplaintRepositoryError::DuplicateVote { .. }));

        let stored = repo
            .find_by_id(&complaint.id)
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(stored.votes, 1);
        assert_eq!(stored.voted_by, vec![voter]);
    }

    #[rstest]
    #[tokio::test]
    async fn concurrent_votes_are_all_counted() {
        let repo = Arc::new(InMemoryComplaintRepository::new());
        let complaint = repo.insert(&new_complaint(0)).await.expect("insert");

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let repo = Arc::clone(&repo);
                let id = complaint.id;
                tokio::spawn(async move { repo.record_vote(&id, &AccountId::random()).await })
            })
            .collect();
        for handle in handles {
            handle.await.expect("join").expect("vote");
        }

        let stored = repo
            .find_by_id(&complaint.id)
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(stored.votes, 16);
        assert_eq!(stored.voted_by.len(), 16);
    }

    #[rstest]
    #[case::vote(true)]
    #[case::status(false)]
    #[tokio::test]
    async fn mutations_on_unknown_ids_report_missing(#[case] vote: bool) {
        let repo = InMemoryComplaintRepository::new();
        let id = ComplaintId::random();
        let err = if vote {
            repo.record_vote(&id, &AccountId::random()).await
        } else {
            repo.set_status(&id, ComplaintStatus::Resolved).await
        }
        .expect_err("missing");
        assert_eq!(err, ComplaintRepositoryError::missing(id.to_string()));
    }

    #[rstest]
    #[tokio::test]
    async fn status_can_move_back_to_pending() {
        let repo = InMemoryComplaintRepository::new();
        let complaint = repo.insert(&new_complaint(0)).await.expect("insert");
        repo.set_status(&complaint.id, ComplaintStatus::Resolved)
            .await
            .expect("resolve");
        let reopened = repo
            .set_status(&complaint.id, ComplaintStatus::Pending)
            .await
            .expect("reopen");
        assert_eq!(reopened.status, ComplaintStatus::Pending);
    }

    #[rstest]
    #[tokio::test]
    async fn sentiment_backfill_updates_the_stored_complaint() {
        let repo = InMemoryComplaintRepository::new();
        let complaint = repo.insert(&new_complaint(0)).await.expect("insert");
        repo.set_sentiment(&complaint.id, -0.4).await.expect("backfill");
        let stored = repo
            .find_by_id(&complaint.id)
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(stored.sentiment, Some(-0.4));
    }
}
