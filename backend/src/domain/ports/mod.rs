//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, scorer, hasher, codec) are implemented by
//! outbound adapters. Driving ports (commands and queries) are implemented by
//! domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_repository;
mod accounts_command;
mod complaint_repository;
mod complaints_command;
mod credential_hasher;
mod sentiment_scorer;
mod token_codec;

#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{AccountRepository, AccountRepositoryError};
pub use accounts_command::{AccountsCommand, Authenticator, LoginOutcome};
#[cfg(test)]
pub use complaint_repository::MockComplaintRepository;
pub use complaint_repository::{ComplaintRepository, ComplaintRepositoryError};
pub use complaints_command::{ComplaintsCommand, ComplaintsQuery};
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHasher, CredentialHasherError};
#[cfg(test)]
pub use sentiment_scorer::MockSentimentScorer;
pub use sentiment_scorer::{SentimentScorer, SentimentScorerError};
#[cfg(test)]
pub use token_codec::MockTokenCodec;
pub use token_codec::{TokenCodec, TokenCodecError};
