//! Sentiment scorer outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `SentimentScorer`
//! port.

mod http_scorer;

pub use http_scorer::HttpSentimentScorer;
