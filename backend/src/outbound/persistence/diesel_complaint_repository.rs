//! PostgreSQL-backed `ComplaintRepository` implementation using Diesel ORM.
//!
//! The voter set lives in `complaint_votes`, keyed by `(complaint_id,
//! account_id)`. A vote increments `complaints.votes` in SQL and inserts the
//! ledger row inside one transaction, so concurrent votes never lose an
//! increment and a repeat vote rolls the increment back.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ComplaintRepository, ComplaintRepositoryError};
use crate::domain::{AccountId, Complaint, ComplaintId, ComplaintStatus, NewComplaint};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{ComplaintRow, NewComplaintRow, NewVoteRow, VoteRow};
use super::pool::{DbPool, PoolError};
use super::schema::{complaint_votes, complaints};

/// Diesel-backed implementation of the `ComplaintRepository` port.
#[derive(Clone)]
pub struct DieselComplaintRepository {
    pool: DbPool,
}

impl DieselComplaintRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ComplaintRepositoryError {
    map_basic_pool_error(error, ComplaintRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ComplaintRepositoryError {
    map_basic_diesel_error(
        error,
        ComplaintRepositoryError::query,
        ComplaintRepositoryError::connection,
    )
}

fn map_vote_error(error: diesel::result::Error, voter: &AccountId) -> ComplaintRepositoryError {
    if is_unique_violation(&error) {
        ComplaintRepositoryError::duplicate_vote(voter.to_string())
    } else {
        map_diesel_error(error)
    }
}

/// Assemble a domain complaint from its row and ordered voter ids.
fn row_to_complaint(
    row: ComplaintRow,
    voters: Vec<Uuid>,
) -> Result<Complaint, ComplaintRepositoryError> {
    let status = row.status.parse::<ComplaintStatus>().map_err(|_| {
        ComplaintRepositoryError::query(format!("stored complaint has invalid status {}", row.status))
    })?;
    let votes = u32::try_from(row.votes)
        .map_err(|_| ComplaintRepositoryError::query("stored complaint has negative votes"))?;
    Ok(Complaint {
        id: ComplaintId::from_uuid(row.id),
        author: AccountId::from_uuid(row.author_id),
        title: row.title,
        body: row.body,
        category: row.category,
        sentiment: row.sentiment,
        votes,
        voted_by: voters.into_iter().map(AccountId::from_uuid).collect(),
        last_voter: row.last_voter_id.map(AccountId::from_uuid),
        status,
        created_at: row.created_at,
    })
}

/// Group ledger rows by complaint, keeping vote order.
fn group_voters(rows: Vec<VoteRow>) -> HashMap<Uuid, Vec<Uuid>> {
    rows.into_iter().fold(HashMap::new(), |mut grouped, row| {
        grouped.entry(row.complaint_id).or_default().push(row.account_id);
        grouped
    })
}

async fn load_voters(
    conn: &mut AsyncPgConnection,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Uuid>>, diesel::result::Error> {
    let rows: Vec<VoteRow> = complaint_votes::table
        .filter(complaint_votes::complaint_id.eq_any(ids))
        .order((complaint_votes::voted_at.asc(), complaint_votes::account_id.asc()))
        .select(VoteRow::as_select())
        .load(conn)
        .await?;
    Ok(group_voters(rows))
}

async fn load_complaint(
    conn: &mut AsyncPgConnection,
    row: ComplaintRow,
) -> Result<Complaint, ComplaintRepositoryError> {
    let mut voters = load_voters(conn, &[row.id])
        .await
        .map_err(map_diesel_error)?;
    let ledger = voters.remove(&row.id).unwrap_or_default();
    row_to_complaint(row, ledger)
}

#[async_trait]
impl ComplaintRepository for DieselComplaintRepository {
    async fn insert(&self, complaint: &NewComplaint) -> Result<Complaint, ComplaintRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewComplaintRow {
            id: *complaint.id.as_uuid(),
            author_id: *complaint.author.as_uuid(),
            title: complaint.title.as_deref(),
            body: &complaint.body,
            category: &complaint.category,
            sentiment: complaint.sentiment,
            created_at: complaint.created_at,
        };
        let stored: ComplaintRow = diesel::insert_into(complaints::table)
            .values(&row)
            .returning(ComplaintRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_complaint(stored, Vec::new())
    }

    async fn list(&self) -> Result<Vec<Complaint>, ComplaintRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ComplaintRow> = complaints::table
            .order((complaints::created_at.desc(), complaints::id.asc()))
            .select(ComplaintRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut voters = load_voters(&mut conn, &ids)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|row| {
                let ledger = voters.remove(&row.id).unwrap_or_default();
                row_to_complaint(row, ledger)
            })
            .collect()
    }

    async fn find_by_id(
        &self,
        id: &ComplaintId,
    ) -> Result<Option<Complaint>, ComplaintRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ComplaintRow> = complaints::table
            .filter(complaints::id.eq(id.as_uuid()))
            .select(ComplaintRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        match row {
            Some(row) => load_complaint(&mut conn, row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn record_vote(
        &self,
        id: &ComplaintId,
        voter: &AccountId,
    ) -> Result<Complaint, ComplaintRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let complaint_id = *id.as_uuid();
        let account_id = *voter.as_uuid();

        let updated: Option<ComplaintRow> = conn
            .transaction(|conn| {
                async move {
                    let row: Option<ComplaintRow> = diesel::update(
                        complaints::table.filter(complaints::id.eq(complaint_id)),
                    )
                    .set((
                        complaints::votes.eq(complaints::votes + 1),
                        complaints::last_voter_id.eq(Some(account_id)),
                    ))
                    .returning(ComplaintRow::as_returning())
                    .get_result(conn)
                    .await
                    .optional()?;
                    if row.is_none() {
                        return Ok(None);
                    }

                    diesel::insert_into(complaint_votes::table)
                        .values(&NewVoteRow {
                            complaint_id,
                            account_id,
                        })
                        .execute(conn)
                        .await?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(|error| map_vote_error(error, voter))?;

        let row = updated.ok_or_else(|| ComplaintRepositoryError::missing(id.to_string()))?;
        load_complaint(&mut conn, row).await
    }

    async fn set_status(
        &self,
        id: &ComplaintId,
        status: ComplaintStatus,
    ) -> Result<Complaint, ComplaintRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ComplaintRow> =
            diesel::update(complaints::table.filter(complaints::id.eq(id.as_uuid())))
                .set(complaints::status.eq(status.as_str()))
                .returning(ComplaintRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;
        let row = row.ok_or_else(|| ComplaintRepositoryError::missing(id.to_string()))?;
        load_complaint(&mut conn, row).await
    }

    async fn set_sentiment(
        &self,
        id: &ComplaintId,
        sentiment: f64,
    ) -> Result<(), ComplaintRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(complaints::table.filter(complaints::id.eq(id.as_uuid())))
            .set(complaints::sentiment.eq(Some(sentiment)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(ComplaintRepositoryError::missing(id.to_string()));
        }
        Ok(())
    }
}
