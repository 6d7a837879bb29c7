//! PostgreSQL persistence adapters using Diesel.
//!
//! Repositories only translate between Diesel rows and domain values. Row
//! structs (`models`) and table definitions (`schema`) stay private to this
//! module, and every database failure is mapped to a port error.
//!
//! # Example
//!
//! ```ignore
//! use splitledger::outbound::persistence::{DbPool, DieselExpenseLedgerRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/splitledger")).await?;
//! let repo = DieselExpenseLedgerRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_expense_ledger_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_expense_ledger_repository::DieselExpenseLedgerRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
