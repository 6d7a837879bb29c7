//! Builders for HTTP state ports over the configured ledger store.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use splitledger::domain::ports::ExpenseLedgerRepository;
use splitledger::domain::{ExpenseCommandService, LedgerQueryService};
use splitledger::inbound::http::state::{HttpState, HttpStatePorts};
use splitledger::outbound::persistence::DieselExpenseLedgerRepository;

use super::config::{LedgerBackend, ServerConfig};

/// Wire the command and query services over one shared repository.
fn ports_for<R>(repo: Arc<R>, clock: Arc<dyn Clock>) -> HttpStatePorts
where
    R: ExpenseLedgerRepository + 'static,
{
    HttpStatePorts {
        expenses: Arc::new(ExpenseCommandService::new(Arc::clone(&repo), clock)),
        ledger: Arc::new(LedgerQueryService::new(repo)),
    }
}

/// Build the HTTP state for the configured ledger backend.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let ports = match &config.ledger {
        LedgerBackend::Postgres(pool) => ports_for(
            Arc::new(DieselExpenseLedgerRepository::new(pool.clone())),
            clock,
        ),
        LedgerBackend::InMemory(repo) => ports_for(Arc::clone(repo), clock),
    };
    web::Data::new(HttpState::new(ports))
}
