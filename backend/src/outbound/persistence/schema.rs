//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` when a migration changes a table.

diesel::table! {
    /// Registered accounts. `email` carries a unique constraint.
    accounts (id) {
        id -> Uuid,
        /// Display name, at most 64 characters.
        name -> Varchar,
        email -> Text,
        /// Argon2id PHC string.
        password_hash -> Text,
        /// `student` or `admin`.
        role -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Submitted complaints.
    complaints (id) {
        id -> Uuid,
        author_id -> Uuid,
        title -> Nullable<Text>,
        body -> Text,
        category -> Text,
        /// Absent until the sentiment scorer answers.
        sentiment -> Nullable<Float8>,
        /// Mirrors the row count in `complaint_votes`.
        votes -> Int4,
        last_voter_id -> Nullable<Uuid>,
        /// `pending`, `resolved`, or `rejected`.
        status -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Voter ledger. The composite primary key rejects repeat votes.
    complaint_votes (complaint_id, account_id) {
        complaint_id -> Uuid,
        account_id -> Uuid,
        voted_at -> Timestamptz,
    }
}

diesel::joinable!(complaints -> accounts (author_id));
diesel::joinable!(complaint_votes -> complaints (complaint_id));

diesel::allow_tables_to_appear_in_same_query!(accounts, complaints, complaint_votes);
