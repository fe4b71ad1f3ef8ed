//! In-memory repository adapters.
//!
//! Used when no database URL is configured and by integration tests. State
//! lives behind a mutex per repository, so every operation is atomic with
//! respect to the others on the same repository.

mod account_repository;
mod complaint_repository;

pub use account_repository::InMemoryAccountRepository;
pub use complaint_repository::InMemoryComplaintRepository;

fn poisoned(what: &str) -> String {
    format!("{what} lock poisoned")
}
