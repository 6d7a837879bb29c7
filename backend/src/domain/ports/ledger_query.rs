//! Driving port for reading group balances and recorded expenses.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Balance, Error, Expense, ExpenseId, GroupId, GroupTotals, MemberPosition};

use super::LoggedShare;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupBalancesRequest {
    pub group_id: GroupId,
}

/// Current debt edges, largest amount first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupBalancesResponse {
    pub group_id: GroupId,
    pub balances: Vec<Balance>,
}

/// Per-member totals in roster order plus group-wide figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSummaryResponse {
    pub group_id: GroupId,
    pub totals: GroupTotals,
    pub members: Vec<MemberPosition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetExpenseRequest {
    pub expense_id: ExpenseId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetExpenseResponse {
    pub expense: Expense,
    pub shares: Vec<LoggedShare>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerQuery: Send + Sync {
    /// List the group's non-zero balances.
    async fn group_balances(
        &self,
        request: GroupBalancesRequest,
    ) -> Result<GroupBalancesResponse, Error>;

    /// Summarise what each member paid, owes and is owed.
    async fn balance_summary(
        &self,
        request: GroupBalancesRequest,
    ) -> Result<BalanceSummaryResponse, Error>;

    /// Fetch one recorded expense with its shares.
    async fn get_expense(&self, request: GetExpenseRequest) -> Result<GetExpenseResponse, Error>;
}

/// Fixture query reporting empty ledgers and missing expenses.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLedgerQuery;

#[async_trait]
impl LedgerQuery for FixtureLedgerQuery {
    async fn group_balances(
        &self,
        request: GroupBalancesRequest,
    ) -> Result<GroupBalancesResponse, Error> {
        Ok(GroupBalancesResponse {
            group_id: request.group_id,
            balances: Vec::new(),
        })
    }

    async fn balance_summary(
        &self,
        request: GroupBalancesRequest,
    ) -> Result<BalanceSummaryResponse, Error> {
        Ok(BalanceSummaryResponse {
            group_id: request.group_id,
            totals: GroupTotals::default(),
            members: Vec::new(),
        })
    }

    async fn get_expense(&self, request: GetExpenseRequest) -> Result<GetExpenseResponse, Error> {
        Err(Error::not_found(format!(
            "expense {} not found",
            request.expense_id
        )))
    }
}
