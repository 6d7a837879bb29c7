//! Driving port for logging expenses against a group ledger.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{CurrencyCode, Error, ExpenseId, ExpenseShare, GroupId, MemberId, Money};

/// Input for [`ExpenseCommand::log_expense`].
///
/// `participant_ids` of `None` means "everyone in the group". An explicit list
/// keeps its order after duplicates are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogExpenseRequest {
    pub group_id: GroupId,
    pub description: String,
    pub amount: Money,
    pub date: NaiveDate,
    #[serde(default)]
    pub currency: Option<CurrencyCode>,
    pub payer_id: MemberId,
    #[serde(default)]
    pub participant_ids: Option<Vec<MemberId>>,
}

/// Result of a committed expense posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogExpenseResponse {
    pub expense_id: ExpenseId,
    pub shares: Vec<LoggedShare>,
}

/// One participant's share as reported back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedShare {
    pub member_id: MemberId,
    pub amount: Money,
}

impl From<&ExpenseShare> for LoggedShare {
    fn from(value: &ExpenseShare) -> Self {
        Self {
            member_id: value.member_id,
            amount: value.amount,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExpenseCommand: Send + Sync {
    /// Validate, split, and post an expense in a single unit of work.
    async fn log_expense(&self, request: LogExpenseRequest) -> Result<LogExpenseResponse, Error>;
}

/// Fixture command that accepts every request without persisting it.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureExpenseCommand;

#[async_trait]
impl ExpenseCommand for FixtureExpenseCommand {
    async fn log_expense(&self, _request: LogExpenseRequest) -> Result<LogExpenseResponse, Error> {
        Ok(LogExpenseResponse {
            expense_id: ExpenseId::random(),
            shares: Vec::new(),
        })
    }
}
