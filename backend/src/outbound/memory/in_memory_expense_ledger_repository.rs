//! In-process `ExpenseLedgerRepository` for development and tests.
//!
//! Postings are serialised by a single async mutex. Writes made during a
//! posting are staged on top of the committed state and only merged once
//! [`post_expense`] succeeds, so a failed posting leaves no trace.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::ports::{
    ExpenseLedgerRepository, ExpenseLedgerRepositoryError, LedgerUnitOfWork,
};
use crate::domain::{
    Balance, BalanceKey, Expense, ExpenseEntry, ExpenseId, ExpenseShare, GroupId, GroupRoster,
    GroupSpending, LedgerPostingError, post_expense, tally_spending,
};

#[derive(Debug, Default)]
struct LedgerState {
    rosters: HashMap<GroupId, GroupRoster>,
    expenses: HashMap<ExpenseId, ExpenseEntry>,
    balances: BTreeMap<BalanceKey, Balance>,
}

/// In-memory ledger store.
#[derive(Debug, Default)]
pub struct InMemoryExpenseLedgerRepository {
    state: Mutex<LedgerState>,
    fail_balance_write_at: Option<usize>,
}

impl InMemoryExpenseLedgerRepository {
    /// Create an empty store with no groups.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group roster.
    #[must_use]
    pub fn with_group(mut self, roster: GroupRoster) -> Self {
        self.state
            .get_mut()
            .rosters
            .insert(roster.group_id(), roster);
        self
    }

    /// Make the `n`th balance write of every posting fail (zero-based).
    ///
    /// Used to exercise rollback of partially applied postings.
    #[must_use]
    pub fn with_failing_balance_write(mut self, n: usize) -> Self {
        self.fail_balance_write_at = Some(n);
        self
    }

    /// Register or replace a group roster at runtime.
    pub async fn upsert_group(&self, roster: GroupRoster) {
        self.state
            .lock()
            .await
            .rosters
            .insert(roster.group_id(), roster);
    }
}

/// Writes staged over the committed balances of one posting.
struct StagedUnitOfWork<'s> {
    committed: &'s BTreeMap<BalanceKey, Balance>,
    staged: BTreeMap<BalanceKey, Option<Balance>>,
    expense: Option<Expense>,
    shares: Vec<ExpenseShare>,
    balance_writes: usize,
    fail_balance_write_at: Option<usize>,
}

impl<'s> StagedUnitOfWork<'s> {
    fn new(committed: &'s BTreeMap<BalanceKey, Balance>, fail_at: Option<usize>) -> Self {
        Self {
            committed,
            staged: BTreeMap::new(),
            expense: None,
            shares: Vec::new(),
            balance_writes: 0,
            fail_balance_write_at: fail_at,
        }
    }

    fn current(&self, key: &BalanceKey) -> Option<&Balance> {
        match self.staged.get(key) {
            Some(staged) => staged.as_ref(),
            None => self.committed.get(key),
        }
    }

    fn record_balance_write(&mut self) -> Result<(), ExpenseLedgerRepositoryError> {
        let write = self.balance_writes;
        self.balance_writes += 1;
        if self.fail_balance_write_at == Some(write) {
            return Err(ExpenseLedgerRepositoryError::query(
                "injected balance write failure",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerUnitOfWork for StagedUnitOfWork<'_> {
    async fn insert_expense(
        &mut self,
        expense: &Expense,
    ) -> Result<(), ExpenseLedgerRepositoryError> {
        self.expense = Some(expense.clone());
        Ok(())
    }

    async fn insert_shares(
        &mut self,
        shares: &[ExpenseShare],
    ) -> Result<(), ExpenseLedgerRepositoryError> {
        self.shares.extend_from_slice(shares);
        Ok(())
    }

    async fn find_balance(
        &mut self,
        key: &BalanceKey,
    ) -> Result<Option<Balance>, ExpenseLedgerRepositoryError> {
        Ok(self.current(key).cloned())
    }

    async fn insert_balance(
        &mut self,
        balance: &Balance,
    ) -> Result<(), ExpenseLedgerRepositoryError> {
        self.record_balance_write()?;
        let key = balance.key();
        if self.current(&key).is_some() {
            return Err(ExpenseLedgerRepositoryError::query(
                "ledger row already exists",
            ));
        }
        self.staged.insert(key, Some(balance.clone()));
        Ok(())
    }

    async fn update_balance(
        &mut self,
        balance: &Balance,
    ) -> Result<(), ExpenseLedgerRepositoryError> {
        self.record_balance_write()?;
        let key = balance.key();
        if self.current(&key).is_none() {
            return Err(ExpenseLedgerRepositoryError::query(
                "balance row disappeared during update",
            ));
        }
        self.staged.insert(key, Some(balance.clone()));
        Ok(())
    }

    async fn delete_balance(
        &mut self,
        key: &BalanceKey,
    ) -> Result<(), ExpenseLedgerRepositoryError> {
        self.record_balance_write()?;
        self.staged.insert(*key, None);
        Ok(())
    }
}

#[async_trait]
impl ExpenseLedgerRepository for InMemoryExpenseLedgerRepository {
    async fn find_roster(
        &self,
        group_id: &GroupId,
    ) -> Result<Option<GroupRoster>, ExpenseLedgerRepositoryError> {
        Ok(self.state.lock().await.rosters.get(group_id).cloned())
    }

    async fn record_expense(
        &self,
        entry: &ExpenseEntry,
        recorded_at: DateTime<Utc>,
    ) -> Result<(), LedgerPostingError> {
        let mut state = self.state.lock().await;
        let group_id = entry.expense.group_id();
        if !state.rosters.contains_key(&group_id) {
            return Err(ExpenseLedgerRepositoryError::query(format!(
                "group {group_id} no longer exists"
            ))
            .into());
        }
        if state.expenses.contains_key(&entry.expense.id()) {
            return Err(ExpenseLedgerRepositoryError::query("ledger row already exists").into());
        }

        let mut uow = StagedUnitOfWork::new(&state.balances, self.fail_balance_write_at);
        let outcomes = post_expense(&mut uow, entry, recorded_at).await?;
        let StagedUnitOfWork {
            staged,
            expense,
            shares,
            ..
        } = uow;

        for (key, balance) in staged {
            match balance {
                Some(balance) => state.balances.insert(key, balance),
                None => state.balances.remove(&key),
            };
        }
        if let Some(expense) = expense {
            state
                .expenses
                .insert(expense.id(), ExpenseEntry { expense, shares });
        }

        debug!(
            %group_id,
            expense_id = %entry.expense.id(),
            adjustments = outcomes.len(),
            "in-memory posting committed"
        );
        Ok(())
    }

    async fn list_balances(
        &self,
        group_id: &GroupId,
    ) -> Result<Vec<Balance>, ExpenseLedgerRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .balances
            .values()
            .filter(|balance| balance.group_id() == *group_id)
            .cloned()
            .collect())
    }

    async fn find_expense(
        &self,
        expense_id: &ExpenseId,
    ) -> Result<Option<ExpenseEntry>, ExpenseLedgerRepositoryError> {
        Ok(self.state.lock().await.expenses.get(expense_id).cloned())
    }

    async fn spending_totals(
        &self,
        group_id: &GroupId,
    ) -> Result<GroupSpending, ExpenseLedgerRepositoryError> {
        let state = self.state.lock().await;
        let entries: Vec<&ExpenseEntry> = state
            .expenses
            .values()
            .filter(|entry| entry.expense.group_id() == *group_id)
            .collect();
        tally_spending(
            entries
                .iter()
                .map(|entry| (entry.expense.payer_id(), entry.expense.amount())),
            entries
                .iter()
                .flat_map(|entry| entry.shares.iter())
                .map(|share| (share.member_id, share.amount)),
        )
        .map_err(|err| ExpenseLedgerRepositoryError::query(format!("spending totals: {err}")))
    }
}
