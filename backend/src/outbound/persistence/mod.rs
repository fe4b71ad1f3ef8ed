//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the account and complaint repository ports
//! backed by PostgreSQL via `diesel-async` and a `bb8` pool.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: pool and Diesel failures map to the port
//!   error enums; unique violations carry domain meaning.
//!
//! # Example
//!
//! ```ignore
//! use grievances::outbound::persistence::{DbPool, DieselComplaintRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/grievances")).await?;
//! let complaints = DieselComplaintRepository::new(pool);
//! ```

mod diesel_account_repository;
mod diesel_basic_error_mapping;
mod diesel_complaint_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_complaint_repository::DieselComplaintRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
