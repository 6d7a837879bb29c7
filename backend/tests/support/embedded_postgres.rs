//! Database provisioning for suites running against embedded PostgreSQL.
//!
//! Databases are dropped and created through `postgres` rather than Diesel so
//! `DROP DATABASE` runs outside a transaction. Schemas come from the crate's
//! embedded migrations so tests never drift from production.

use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};
use splitledger::domain::ports::ExpenseLedgerRepositoryError;
use splitledger::outbound::persistence::run_pending_migrations;

use super::format_postgres_error;

/// Drop `name` if it exists and create it empty.
pub fn reset_database(
    cluster: &TestCluster,
    name: &str,
) -> Result<(), ExpenseLedgerRepositoryError> {
    let admin_url = cluster.connection().database_url("postgres");
    let mut client = Client::connect(&admin_url, NoTls)
        .map_err(|err| ExpenseLedgerRepositoryError::connection(format_postgres_error(&err)))?;
    // Separate statements: a multi-statement batch runs in an implicit
    // transaction, which `DROP DATABASE` refuses.
    for statement in [
        format!("DROP DATABASE IF EXISTS \"{name}\" WITH (FORCE)"),
        format!("CREATE DATABASE \"{name}\""),
    ] {
        client
            .batch_execute(&statement)
            .map_err(|err| ExpenseLedgerRepositoryError::query(format_postgres_error(&err)))?;
    }
    Ok(())
}

/// Apply the ledger migrations to the database at `url`.
pub fn migrate_schema(url: &str) -> Result<(), ExpenseLedgerRepositoryError> {
    run_pending_migrations(url)
        .map(|_| ())
        .map_err(|err| ExpenseLedgerRepositoryError::query(format!("migration: {err}")))
}
