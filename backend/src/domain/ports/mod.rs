//! Domain ports for the hexagonal boundary.
//!
//! Driving ports ([`ExpenseCommand`], [`LedgerQuery`]) are implemented by
//! domain services and called by inbound adapters. Driven ports
//! ([`ExpenseLedgerRepository`], [`LedgerUnitOfWork`]) are implemented by
//! outbound adapters and report strongly typed errors.

mod macros;
pub(crate) use macros::define_port_error;

mod expense_command;
mod expense_ledger_repository;
mod ledger_query;
mod ledger_unit_of_work;

#[cfg(test)]
pub use expense_command::MockExpenseCommand;
pub use expense_command::{
    ExpenseCommand, FixtureExpenseCommand, LogExpenseRequest, LogExpenseResponse, LoggedShare,
};
#[cfg(test)]
pub use expense_ledger_repository::MockExpenseLedgerRepository;
pub use expense_ledger_repository::{
    ExpenseLedgerRepository, ExpenseLedgerRepositoryError, FixtureExpenseLedgerRepository,
};
#[cfg(test)]
pub use ledger_query::MockLedgerQuery;
pub use ledger_query::{
    BalanceSummaryResponse, FixtureLedgerQuery, GetExpenseRequest, GetExpenseResponse,
    GroupBalancesRequest, GroupBalancesResponse, LedgerQuery,
};
pub use ledger_unit_of_work::LedgerUnitOfWork;
