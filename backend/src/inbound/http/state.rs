//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    ExpenseCommand, FixtureExpenseCommand, FixtureLedgerQuery, LedgerQuery,
};

/// Parameter object bundling the port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub expenses: Arc<dyn ExpenseCommand>,
    pub ledger: Arc<dyn LedgerQuery>,
}

impl Default for HttpStatePorts {
    fn default() -> Self {
        Self {
            expenses: Arc::new(FixtureExpenseCommand),
            ledger: Arc::new(FixtureLedgerQuery),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub expenses: Arc<dyn ExpenseCommand>,
    pub ledger: Arc<dyn LedgerQuery>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```
    /// use splitledger::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// let state = HttpState::new(HttpStatePorts::default());
    /// let _ledger = state.ledger.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts { expenses, ledger } = ports;
        Self { expenses, ledger }
    }
}
