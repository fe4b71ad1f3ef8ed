//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: mutex-guarded in-memory repositories for development runs
//!   without a database
//! - **security**: Argon2 password hashing and HS256 bearer credentials
//! - **sentiment**: reqwest client for the external sentiment scorer
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod memory;
pub mod persistence;
pub mod security;
pub mod sentiment;
