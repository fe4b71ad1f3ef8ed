//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{accounts, complaint_votes, complaints};

/// Row struct for reading from the accounts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

/// Insertable struct for registering an account.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub(crate) struct NewAccountRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
}

/// Row struct for reading from the complaints table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = complaints)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ComplaintRow {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: Option<String>,
    pub body: String,
    pub category: String,
    pub sentiment: Option<f64>,
    pub votes: i32,
    pub last_voter_id: Option<Uuid>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for submitting a complaint.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = complaints)]
pub(crate) struct NewComplaintRow<'a> {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: Option<&'a str>,
    pub body: &'a str,
    pub category: &'a str,
    pub sentiment: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading the voter ledger.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = complaint_votes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VoteRow {
    pub complaint_id: Uuid,
    pub account_id: Uuid,
}

/// Insertable voter ledger entry; `voted_at` defaults in SQL.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = complaint_votes)]
pub(crate) struct NewVoteRow {
    pub complaint_id: Uuid,
    pub account_id: Uuid,
}
