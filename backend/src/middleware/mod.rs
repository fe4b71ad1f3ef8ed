//! Actix middleware shared by every route.
//!
//! [`Trace`] assigns each request a [`crate::TraceId`] and echoes it in the
//! `trace-id` response header.

pub mod trace;

pub use trace::Trace;
