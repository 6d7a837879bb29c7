//! PostgreSQL-backed `ExpenseLedgerRepository` using Diesel.
//!
//! `record_expense` runs in one transaction. The group row is locked
//! `FOR UPDATE` first, so postings to the same group queue behind each other,
//! and every balance read inside the unit also takes a row lock. A failure at
//! any step rolls back the expense, its shares, and all balance changes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{
    ExpenseLedgerRepository, ExpenseLedgerRepositoryError, LedgerUnitOfWork,
};
use crate::domain::{
    Balance, BalanceKey, CurrencyCode, Expense, ExpenseDraft, ExpenseEntry, ExpenseId,
    ExpenseShare, GroupId, GroupRoster, GroupSpending, LedgerPostingError, MemberId, Money,
    post_expense, tally_spending,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{
    BalanceRow, BalanceUpdate, ExpenseRow, ExpenseShareRow, NewBalanceRow, NewExpenseRow,
    NewExpenseShareRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{balances, expense_shares, expenses, groups, members};

/// Diesel-backed implementation of the expense ledger port.
#[derive(Clone)]
pub struct DieselExpenseLedgerRepository {
    pool: DbPool,
}

impl DieselExpenseLedgerRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ExpenseLedgerRepositoryError {
    map_basic_pool_error(error, ExpenseLedgerRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ExpenseLedgerRepositoryError {
    map_basic_diesel_error(
        error,
        ExpenseLedgerRepositoryError::query,
        ExpenseLedgerRepositoryError::connection,
    )
}

/// Error carried out of the posting transaction.
#[derive(Debug)]
enum PostingFailure {
    Diesel(diesel::result::Error),
    Posting(LedgerPostingError),
}

impl From<diesel::result::Error> for PostingFailure {
    fn from(value: diesel::result::Error) -> Self {
        Self::Diesel(value)
    }
}

impl From<PostingFailure> for LedgerPostingError {
    fn from(value: PostingFailure) -> Self {
        match value {
            PostingFailure::Diesel(error) => LedgerPostingError::Store(map_diesel_error(error)),
            PostingFailure::Posting(error) => error,
        }
    }
}

fn row_to_balance(row: BalanceRow) -> Result<Balance, ExpenseLedgerRepositoryError> {
    let key = BalanceKey::new(
        GroupId::from_uuid(row.group_id),
        MemberId::from_uuid(row.creditor_id),
        MemberId::from_uuid(row.debtor_id),
    );
    Balance::new(key, Money::from_cents(row.amount_cents), row.updated_at)
        .map_err(|err| ExpenseLedgerRepositoryError::query(format!("stored balance: {err}")))
}

fn row_to_expense(row: ExpenseRow) -> Result<Expense, ExpenseLedgerRepositoryError> {
    let currency = CurrencyCode::new(&row.currency)
        .map_err(|err| ExpenseLedgerRepositoryError::query(format!("stored expense: {err}")))?;
    Expense::new(ExpenseDraft {
        id: ExpenseId::from_uuid(row.id),
        group_id: GroupId::from_uuid(row.group_id),
        description: row.description,
        amount: Money::from_cents(row.amount_cents),
        date: row.expense_date,
        currency,
        payer_id: MemberId::from_uuid(row.paid_by_id),
    })
    .map_err(|err| ExpenseLedgerRepositoryError::query(format!("stored expense: {err}")))
}

macro_rules! balance_pair {
    ($key:expr) => {
        balances::table
            .filter(balances::group_id.eq(*$key.group_id.as_uuid()))
            .filter(balances::creditor_id.eq(*$key.creditor_id.as_uuid()))
            .filter(balances::debtor_id.eq(*$key.debtor_id.as_uuid()))
    };
}

/// Unit of work bound to an open transaction.
struct PgUnitOfWork<'c> {
    conn: &'c mut AsyncPgConnection,
}

#[async_trait]
impl LedgerUnitOfWork for PgUnitOfWork<'_> {
    async fn insert_expense(
        &mut self,
        expense: &Expense,
    ) -> Result<(), ExpenseLedgerRepositoryError> {
        let currency = expense.currency();
        let row = NewExpenseRow {
            id: *expense.id().as_uuid(),
            group_id: *expense.group_id().as_uuid(),
            description: expense.description(),
            amount_cents: expense.amount().cents(),
            currency: currency.as_str(),
            expense_date: expense.date(),
            paid_by_id: *expense.payer_id().as_uuid(),
        };
        diesel::insert_into(expenses::table)
            .values(&row)
            .execute(&mut *self.conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn insert_shares(
        &mut self,
        shares: &[ExpenseShare],
    ) -> Result<(), ExpenseLedgerRepositoryError> {
        let rows = shares
            .iter()
            .enumerate()
            .map(|(index, share)| {
                let position = i32::try_from(index)
                    .map_err(|_| ExpenseLedgerRepositoryError::query("too many shares"))?;
                Ok(NewExpenseShareRow {
                    expense_id: *share.expense_id.as_uuid(),
                    member_id: *share.member_id.as_uuid(),
                    position,
                    amount_cents: share.amount.cents(),
                })
            })
            .collect::<Result<Vec<_>, ExpenseLedgerRepositoryError>>()?;

        diesel::insert_into(expense_shares::table)
            .values(&rows)
            .execute(&mut *self.conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find_balance(
        &mut self,
        key: &BalanceKey,
    ) -> Result<Option<Balance>, ExpenseLedgerRepositoryError> {
        let row = balance_pair!(key)
            .select(BalanceRow::as_select())
            .for_update()
            .first(&mut *self.conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_balance).transpose()
    }

    async fn insert_balance(
        &mut self,
        balance: &Balance,
    ) -> Result<(), ExpenseLedgerRepositoryError> {
        let row = NewBalanceRow {
            group_id: *balance.group_id().as_uuid(),
            creditor_id: *balance.creditor_id().as_uuid(),
            debtor_id: *balance.debtor_id().as_uuid(),
            amount_cents: balance.amount().cents(),
            updated_at: balance.updated_at(),
        };
        diesel::insert_into(balances::table)
            .values(&row)
            .execute(&mut *self.conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update_balance(
        &mut self,
        balance: &Balance,
    ) -> Result<(), ExpenseLedgerRepositoryError> {
        let changes = BalanceUpdate {
            amount_cents: balance.amount().cents(),
            updated_at: balance.updated_at(),
        };
        let key = balance.key();
        let updated = diesel::update(balance_pair!(key))
            .set(&changes)
            .execute(&mut *self.conn)
            .await
            .map_err(map_diesel_error)?;
        if updated != 1 {
            return Err(ExpenseLedgerRepositoryError::query(
                "balance row disappeared during update",
            ));
        }
        Ok(())
    }

    async fn delete_balance(
        &mut self,
        key: &BalanceKey,
    ) -> Result<(), ExpenseLedgerRepositoryError> {
        diesel::delete(balance_pair!(key))
            .execute(&mut *self.conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}

/// Lock the group row for the rest of the transaction.
async fn lock_group(
    conn: &mut AsyncPgConnection,
    group_id: GroupId,
) -> Result<(), PostingFailure> {
    let locked: Option<Uuid> = groups::table
        .find(*group_id.as_uuid())
        .select(groups::id)
        .for_update()
        .first(conn)
        .await
        .optional()?;
    if locked.is_none() {
        return Err(PostingFailure::Posting(LedgerPostingError::Store(
            ExpenseLedgerRepositoryError::query(format!("group {group_id} no longer exists")),
        )));
    }
    Ok(())
}

#[async_trait]
impl ExpenseLedgerRepository for DieselExpenseLedgerRepository {
    async fn find_roster(
        &self,
        group_id: &GroupId,
    ) -> Result<Option<GroupRoster>, ExpenseLedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let group: Option<(Uuid, String)> = groups::table
            .find(*group_id.as_uuid())
            .select((groups::id, groups::name))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some((id, name)) = group else {
            return Ok(None);
        };

        let member_ids: Vec<Uuid> = members::table
            .filter(members::group_id.eq(id))
            .order((members::created_at.asc(), members::id.asc()))
            .select(members::id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(Some(GroupRoster::new(
            GroupId::from_uuid(id),
            name,
            member_ids.into_iter().map(MemberId::from_uuid).collect(),
        )))
    }

    async fn record_expense(
        &self,
        entry: &ExpenseEntry,
        recorded_at: DateTime<Utc>,
    ) -> Result<(), LedgerPostingError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| LedgerPostingError::Store(map_pool_error(err)))?;
        let group_id = entry.expense.group_id();

        let outcomes = conn
            .transaction::<_, PostingFailure, _>(|conn| {
                async move {
                    lock_group(conn, group_id).await?;
                    let mut uow = PgUnitOfWork { conn };
                    post_expense(&mut uow, entry, recorded_at)
                        .await
                        .map_err(PostingFailure::Posting)
                }
                .scope_boxed()
            })
            .await?;

        debug!(
            %group_id,
            expense_id = %entry.expense.id(),
            adjustments = outcomes.len(),
            "expense transaction committed"
        );
        Ok(())
    }

    async fn list_balances(
        &self,
        group_id: &GroupId,
    ) -> Result<Vec<Balance>, ExpenseLedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BalanceRow> = balances::table
            .filter(balances::group_id.eq(*group_id.as_uuid()))
            .select(BalanceRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_balance).collect()
    }

    async fn find_expense(
        &self,
        expense_id: &ExpenseId,
    ) -> Result<Option<ExpenseEntry>, ExpenseLedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ExpenseRow> = expenses::table
            .find(*expense_id.as_uuid())
            .select(ExpenseRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let share_rows: Vec<ExpenseShareRow> = expense_shares::table
            .filter(expense_shares::expense_id.eq(row.id))
            .order(expense_shares::position.asc())
            .select(ExpenseShareRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let expense = row_to_expense(row)?;
        let shares = share_rows
            .into_iter()
            .map(|share| ExpenseShare {
                expense_id: ExpenseId::from_uuid(share.expense_id),
                member_id: MemberId::from_uuid(share.member_id),
                amount: Money::from_cents(share.amount_cents),
            })
            .collect();
        Ok(Some(ExpenseEntry { expense, shares }))
    }

    async fn spending_totals(
        &self,
        group_id: &GroupId,
    ) -> Result<GroupSpending, ExpenseLedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let payments: Vec<(Uuid, i64)> = expenses::table
            .filter(expenses::group_id.eq(*group_id.as_uuid()))
            .select((expenses::paid_by_id, expenses::amount_cents))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let shares: Vec<(Uuid, i64)> = expense_shares::table
            .inner_join(expenses::table)
            .filter(expenses::group_id.eq(*group_id.as_uuid()))
            .select((expense_shares::member_id, expense_shares::amount_cents))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let to_totals = |(member, cents): (Uuid, i64)| {
            (MemberId::from_uuid(member), Money::from_cents(cents))
        };
        tally_spending(
            payments.into_iter().map(to_totals),
            shares.into_iter().map(to_totals),
        )
        .map_err(|err| ExpenseLedgerRepositoryError::query(format!("spending totals: {err}")))
    }
}
