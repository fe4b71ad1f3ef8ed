//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountsCommand, Authenticator, ComplaintsCommand, ComplaintsQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountsCommand>,
    pub auth: Arc<dyn Authenticator>,
    pub complaints: Arc<dyn ComplaintsCommand>,
    pub complaints_query: Arc<dyn ComplaintsQuery>,
}

impl HttpState {
    /// Construct state from the driving ports.
    ///
    /// Services implementing several ports are passed once per port.
    pub fn new(
        accounts: Arc<dyn AccountsCommand>,
        auth: Arc<dyn Authenticator>,
        complaints: Arc<dyn ComplaintsCommand>,
        complaints_query: Arc<dyn ComplaintsQuery>,
    ) -> Self {
        Self {
            accounts,
            auth,
            complaints,
            complaints_query,
        }
    }
}
