//! Expense ledger domain services.
//!
//! [`ExpenseCommandService`] implements `logExpense`: it validates the payload
//! and group membership up front, splits the amount, and hands the resulting
//! entry to the repository for a single atomic posting. Nothing is written
//! when validation fails. [`LedgerQueryService`] serves the read side.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{error, info};

use crate::domain::ports::{
    BalanceSummaryResponse, ExpenseCommand, ExpenseLedgerRepository, ExpenseLedgerRepositoryError,
    GetExpenseRequest, GetExpenseResponse, GroupBalancesRequest, GroupBalancesResponse,
    LedgerQuery, LogExpenseRequest, LogExpenseResponse, LoggedShare,
};
use crate::domain::{
    Error, Expense, ExpenseDraft, ExpenseEntry, ExpenseId, ExpenseShare, ExpenseValidationError,
    GroupId, GroupRoster, GroupTotals, LedgerPostingError, MemberId, MoneyError, SplitError,
    sort_for_display, split_evenly, summarise_positions,
};

fn map_repository_error(error: ExpenseLedgerRepositoryError) -> Error {
    match error {
        ExpenseLedgerRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("expense ledger unavailable: {message}"))
        }
        ExpenseLedgerRepositoryError::Query { message } => {
            Error::internal(format!("expense ledger error: {message}"))
        }
    }
}

fn map_posting_error(error: LedgerPostingError) -> Error {
    match error {
        LedgerPostingError::Store(store) => map_repository_error(store),
        other => Error::internal(format!("expense posting failed: {other}")),
    }
}

fn map_validation_error(error: ExpenseValidationError) -> Error {
    let field = match &error {
        ExpenseValidationError::EmptyDescription
        | ExpenseValidationError::DescriptionTooLong { .. } => "description",
        ExpenseValidationError::NonPositiveAmount
        | ExpenseValidationError::AmountTooLarge { .. } => "amount",
        ExpenseValidationError::InvalidCurrency { .. } => "currency",
    };
    Error::invalid_request(error.to_string()).with_details(json!({ "field": field }))
}

fn map_split_error(error: SplitError) -> Error {
    match error {
        SplitError::InvalidAmount { .. } => Error::invalid_request(error.to_string())
            .with_details(json!({ "field": "amount" })),
        SplitError::EmptyParticipantSet => Error::membership_violation(error.to_string()),
        SplitError::DuplicateParticipant { .. } => {
            Error::internal(format!("participant resolution failed: {error}"))
        }
    }
}

fn group_not_found(group_id: GroupId) -> Error {
    Error::not_found(format!("group {group_id} not found"))
        .with_details(json!({ "groupId": group_id }))
}

/// Resolve the participant list for an expense.
///
/// `None` selects the whole roster in roster order. An explicit list keeps the
/// caller's order with later duplicates dropped.
fn resolve_participants(
    roster: &GroupRoster,
    payer_id: MemberId,
    requested: Option<Vec<MemberId>>,
) -> Result<Vec<MemberId>, Error> {
    if !roster.contains(&payer_id) {
        return Err(Error::membership_violation(format!(
            "payer {payer_id} is not a member of group {}",
            roster.group_id()
        ))
        .with_details(json!({ "field": "paidById", "memberId": payer_id })));
    }

    let participants: Vec<MemberId> = match requested {
        None => roster.member_ids().to_vec(),
        Some(ids) => {
            let mut seen = HashSet::with_capacity(ids.len());
            ids.into_iter().filter(|id| seen.insert(*id)).collect()
        }
    };

    if participants.is_empty() {
        return Err(Error::membership_violation("at least one participant is required")
            .with_details(json!({ "field": "participantIds" })));
    }
    if let Some(outsider) = participants.iter().find(|id| !roster.contains(id)) {
        return Err(Error::membership_violation(format!(
            "participant {outsider} is not a member of group {}",
            roster.group_id()
        ))
        .with_details(json!({ "field": "participantIds", "memberId": outsider })));
    }
    if !participants.contains(&payer_id) {
        return Err(
            Error::membership_violation("payer must be one of the participants")
                .with_details(json!({ "field": "participantIds", "memberId": payer_id })),
        );
    }
    Ok(participants)
}

/// Expense service implementing the command driving port.
#[derive(Clone)]
pub struct ExpenseCommandService<R> {
    ledger_repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> ExpenseCommandService<R> {
    /// Create a command service over the ledger repository.
    pub fn new(ledger_repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { ledger_repo, clock }
    }
}

#[async_trait]
impl<R> ExpenseCommand for ExpenseCommandService<R>
where
    R: ExpenseLedgerRepository,
{
    async fn log_expense(&self, request: LogExpenseRequest) -> Result<LogExpenseResponse, Error> {
        let LogExpenseRequest {
            group_id,
            description,
            amount,
            date,
            currency,
            payer_id,
            participant_ids,
        } = request;

        let expense = Expense::new(ExpenseDraft {
            id: ExpenseId::random(),
            group_id,
            description,
            amount,
            date,
            currency: currency.unwrap_or_default(),
            payer_id,
        })
        .map_err(map_validation_error)?;

        let roster = self
            .ledger_repo
            .find_roster(&group_id)
            .await
            .map_err(map_repository_error)?
            .filter(|roster| !roster.is_empty())
            .ok_or_else(|| group_not_found(group_id))?;

        let participants = resolve_participants(&roster, payer_id, participant_ids)?;
        let shares: Vec<ExpenseShare> = split_evenly(expense.amount(), &participants)
            .map_err(map_split_error)?
            .into_iter()
            .map(|allocation| ExpenseShare {
                expense_id: expense.id(),
                member_id: allocation.member_id,
                amount: allocation.amount,
            })
            .collect();

        let entry = ExpenseEntry { expense, shares };
        let expense_id = entry.expense.id();
        if let Err(err) = self
            .ledger_repo
            .record_expense(&entry, self.clock.utc())
            .await
        {
            error!(%group_id, %expense_id, error = %err, "expense posting rolled back");
            return Err(map_posting_error(err));
        }

        info!(
            %group_id,
            %expense_id,
            payer_id = %payer_id,
            amount = %entry.expense.amount(),
            participants = entry.shares.len(),
            "expense logged"
        );
        Ok(LogExpenseResponse {
            expense_id,
            shares: entry.shares.iter().map(LoggedShare::from).collect(),
        })
    }
}

/// Ledger service implementing the query driving port.
#[derive(Clone)]
pub struct LedgerQueryService<R> {
    ledger_repo: Arc<R>,
}

impl<R> LedgerQueryService<R> {
    /// Create a query service over the ledger repository.
    pub fn new(ledger_repo: Arc<R>) -> Self {
        Self { ledger_repo }
    }
}

impl<R> LedgerQueryService<R>
where
    R: ExpenseLedgerRepository,
{
    async fn require_roster(&self, group_id: GroupId) -> Result<GroupRoster, Error> {
        self.ledger_repo
            .find_roster(&group_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| group_not_found(group_id))
    }
}

#[async_trait]
impl<R> LedgerQuery for LedgerQueryService<R>
where
    R: ExpenseLedgerRepository,
{
    async fn group_balances(
        &self,
        request: GroupBalancesRequest,
    ) -> Result<GroupBalancesResponse, Error> {
        let roster = self.require_roster(request.group_id).await?;
        let mut balances = self
            .ledger_repo
            .list_balances(&roster.group_id())
            .await
            .map_err(map_repository_error)?;
        sort_for_display(&mut balances);

        Ok(GroupBalancesResponse {
            group_id: roster.group_id(),
            balances,
        })
    }

    async fn balance_summary(
        &self,
        request: GroupBalancesRequest,
    ) -> Result<BalanceSummaryResponse, Error> {
        let roster = self.require_roster(request.group_id).await?;
        let balances = self
            .ledger_repo
            .list_balances(&roster.group_id())
            .await
            .map_err(map_repository_error)?;
        let spending = self
            .ledger_repo
            .spending_totals(&roster.group_id())
            .await
            .map_err(map_repository_error)?;
        let summary_failed =
            |err: MoneyError| Error::internal(format!("balance summary failed: {err}"));
        let members = summarise_positions(roster.member_ids(), &balances, &spending)
            .map_err(summary_failed)?;
        let totals = GroupTotals::new(&spending, &balances).map_err(summary_failed)?;

        Ok(BalanceSummaryResponse {
            group_id: roster.group_id(),
            totals,
            members,
        })
    }

    async fn get_expense(&self, request: GetExpenseRequest) -> Result<GetExpenseResponse, Error> {
        let entry = self
            .ledger_repo
            .find_expense(&request.expense_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| {
                Error::not_found(format!("expense {} not found", request.expense_id))
            })?;

        Ok(GetExpenseResponse {
            shares: entry.shares.iter().map(LoggedShare::from).collect(),
            expense: entry.expense,
        })
    }
}

#[cfg(test)]
#[path = "expense_ledger_service_tests.rs"]
mod tests;
