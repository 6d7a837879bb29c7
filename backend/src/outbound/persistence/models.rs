//! Internal Diesel row structs for the ledger tables.
//!
//! These types never leave the persistence layer; repositories convert them
//! into domain values.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{balances, expense_shares, expenses};

/// Row struct for reading from the expenses table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = expenses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ExpenseRow {
    pub id: Uuid,
    pub group_id: Uuid,
    pub description: String,
    pub amount_cents: i64,
    pub currency: String,
    pub expense_date: NaiveDate,
    pub paid_by_id: Uuid,
}

/// Insertable struct for new expense records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = expenses)]
pub(crate) struct NewExpenseRow<'a> {
    pub id: Uuid,
    pub group_id: Uuid,
    pub description: &'a str,
    pub amount_cents: i64,
    pub currency: &'a str,
    pub expense_date: NaiveDate,
    pub paid_by_id: Uuid,
}

/// Row struct for reading from the expense_shares table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = expense_shares)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ExpenseShareRow {
    pub expense_id: Uuid,
    pub member_id: Uuid,
    pub amount_cents: i64,
}

/// Insertable struct for new share records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = expense_shares)]
pub(crate) struct NewExpenseShareRow {
    pub expense_id: Uuid,
    pub member_id: Uuid,
    pub position: i32,
    pub amount_cents: i64,
}

/// Row struct for reading from the balances table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = balances)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BalanceRow {
    pub group_id: Uuid,
    pub creditor_id: Uuid,
    pub debtor_id: Uuid,
    pub amount_cents: i64,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for new balance edges.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = balances)]
pub(crate) struct NewBalanceRow {
    pub group_id: Uuid,
    pub creditor_id: Uuid,
    pub debtor_id: Uuid,
    pub amount_cents: i64,
    pub updated_at: DateTime<Utc>,
}

/// Changeset applied when an existing edge grows or shrinks.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = balances)]
pub(crate) struct BalanceUpdate {
    pub amount_cents: i64,
    pub updated_at: DateTime<Utc>,
}
