//! HTTP inbound adapter exposing REST endpoints.

pub mod accounts;
pub mod bearer;
pub mod complaints;
pub mod error;
pub mod health;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
