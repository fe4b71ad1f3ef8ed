//! Campus grievance backend library modules.
//!
//! Hexagonal layout: `domain` holds entities, ports, and services;
//! `inbound` adapts HTTP requests onto driving ports; `outbound` implements
//! driven ports over PostgreSQL, process memory, Argon2/JWT, and the
//! sentiment scorer; `client` is the typed HTTP client used by the CLI.

pub mod client;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
