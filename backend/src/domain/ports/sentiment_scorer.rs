//! Port for the external sentiment scoring service.
//!
//! The scorer is an opaque function from text to a number; the range of the
//! score is not constrained here.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by sentiment scorer adapters.
    pub enum SentimentScorerError {
        /// The scorer could not be reached.
        Transport { message: String } => "sentiment scorer transport failed: {message}",
        /// The scorer did not answer within the configured bound.
        Timeout { message: String } => "sentiment scorer timed out: {message}",
        /// The scorer answered with a non-success HTTP status.
        Status { status: u16, message: String } =>
            "sentiment scorer returned status {status}: {message}",
        /// The scorer payload could not be decoded.
        Decode { message: String } => "sentiment scorer payload invalid: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SentimentScorer: Send + Sync {
    /// Score `text`, returning the numeric sentiment.
    async fn score(&self, text: &str) -> Result<f64, SentimentScorerError>;
}
