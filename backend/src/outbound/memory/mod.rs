//! In-process adapters used when no database is configured and in tests.

mod in_memory_expense_ledger_repository;
mod roster_seed;

pub use in_memory_expense_ledger_repository::InMemoryExpenseLedgerRepository;
pub use roster_seed::{RosterSeedError, load_roster_seed, parse_roster_seed};
