//! Expense HTTP handlers.
//!
//! ```text
//! POST /api/v1/groups/{groupId}/expenses
//! GET  /api/v1/expenses/{expenseId}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{
    GetExpenseRequest, GetExpenseResponse, LogExpenseRequest, LogExpenseResponse, LoggedShare,
};
use crate::domain::{Error, ExpenseId, GroupId, MemberId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_date, parse_money, parse_optional_currency, parse_uuid, parse_uuid_list,
    require,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GroupPath {
    group_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExpensePath {
    expense_id: String,
}

pub(crate) fn parse_group_id(path: GroupPath) -> Result<GroupId, Error> {
    parse_uuid(path.group_id, FieldName::new("groupId")).map(GroupId::from_uuid)
}

/// Request payload for logging an expense.
///
/// `participantIds` may be omitted to split between every group member.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogExpenseRequestBody {
    #[schema(example = "Groceries")]
    pub description: Option<String>,
    /// Decimal amount in major units.
    #[schema(example = "30.00")]
    pub amount: Option<String>,
    #[schema(format = "date", example = "2026-04-02")]
    pub date: Option<String>,
    #[schema(format = "uuid")]
    pub paid_by_id: Option<String>,
    #[schema(value_type = Option<Vec<uuid::Uuid>>)]
    #[serde(default)]
    pub participant_ids: Option<Vec<String>>,
    #[schema(example = "USD")]
    #[serde(default)]
    pub currency: Option<String>,
}

/// One participant's share of an expense.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareBody {
    #[schema(format = "uuid")]
    pub member_id: String,
    #[schema(example = "10.00")]
    pub amount: String,
}

impl From<&LoggedShare> for ShareBody {
    fn from(value: &LoggedShare) -> Self {
        Self {
            member_id: value.member_id.to_string(),
            amount: value.amount.to_string(),
        }
    }
}

/// Response payload for a logged expense.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogExpenseResponseBody {
    #[schema(format = "uuid")]
    pub expense_id: String,
    pub shares: Vec<ShareBody>,
}

impl From<LogExpenseResponse> for LogExpenseResponseBody {
    fn from(value: LogExpenseResponse) -> Self {
        Self {
            expense_id: value.expense_id.to_string(),
            shares: value.shares.iter().map(ShareBody::from).collect(),
        }
    }
}

/// Stored expense with its shares.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub group_id: String,
    pub description: String,
    pub amount: String,
    pub currency: String,
    #[schema(format = "date")]
    pub date: String,
    #[schema(format = "uuid")]
    pub paid_by_id: String,
    pub shares: Vec<ShareBody>,
}

impl From<GetExpenseResponse> for ExpenseBody {
    fn from(value: GetExpenseResponse) -> Self {
        let GetExpenseResponse { expense, shares } = value;
        Self {
            id: expense.id().to_string(),
            group_id: expense.group_id().to_string(),
            description: expense.description().to_owned(),
            amount: expense.amount().to_string(),
            currency: expense.currency().to_string(),
            date: expense.date().format("%Y-%m-%d").to_string(),
            paid_by_id: expense.payer_id().to_string(),
            shares: shares.iter().map(ShareBody::from).collect(),
        }
    }
}

fn parse_log_expense_payload(
    group_id: GroupId,
    payload: LogExpenseRequestBody,
) -> Result<LogExpenseRequest, Error> {
    let LogExpenseRequestBody {
        description,
        amount,
        date,
        paid_by_id,
        participant_ids,
        currency,
    } = payload;

    let amount_field = FieldName::new("amount");
    let date_field = FieldName::new("date");
    let payer_field = FieldName::new("paidById");
    let participants_field = FieldName::new("participantIds");

    Ok(LogExpenseRequest {
        group_id,
        description: require(description, FieldName::new("description"))?,
        amount: parse_money(require(amount, amount_field)?, amount_field)?,
        date: parse_date(require(date, date_field)?, date_field)?,
        currency: parse_optional_currency(currency, FieldName::new("currency"))?,
        payer_id: MemberId::from_uuid(parse_uuid(
            require(paid_by_id, payer_field)?,
            payer_field,
        )?),
        participant_ids: participant_ids
            .map(|ids| parse_uuid_list(ids, participants_field))
            .transpose()?
            .map(|ids| ids.into_iter().map(MemberId::from_uuid).collect()),
    })
}

/// Log an expense and update the group's balances.
#[utoipa::path(
    post,
    path = "/api/v1/groups/{groupId}/expenses",
    request_body = LogExpenseRequestBody,
    params(
        ("groupId" = String, Path, description = "Group identifier")
    ),
    responses(
        (status = 201, description = "Expense logged", body = LogExpenseResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Group not found", body = Error),
        (status = 422, description = "Payer or participant outside the group", body = Error),
        (status = 503, description = "Ledger store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["expenses"],
    operation_id = "logExpense"
)]
#[post("/groups/{groupId}/expenses")]
pub async fn log_expense(
    state: web::Data<HttpState>,
    path: web::Path<GroupPath>,
    payload: web::Json<LogExpenseRequestBody>,
) -> ApiResult<HttpResponse> {
    let group_id = parse_group_id(path.into_inner())?;
    let request = parse_log_expense_payload(group_id, payload.into_inner())?;
    let response = state.expenses.log_expense(request).await?;
    Ok(HttpResponse::Created().json(LogExpenseResponseBody::from(response)))
}

/// Fetch a recorded expense with its shares.
#[utoipa::path(
    get,
    path = "/api/v1/expenses/{expenseId}",
    params(
        ("expenseId" = String, Path, description = "Expense identifier")
    ),
    responses(
        (status = 200, description = "Expense", body = ExpenseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Expense not found", body = Error),
        (status = 503, description = "Ledger store unavailable", body = Error)
    ),
    tags = ["expenses"],
    operation_id = "getExpense"
)]
#[get("/expenses/{expenseId}")]
pub async fn get_expense(
    state: web::Data<HttpState>,
    path: web::Path<ExpensePath>,
) -> ApiResult<web::Json<ExpenseBody>> {
    let expense_id = parse_uuid(path.into_inner().expense_id, FieldName::new("expenseId"))
        .map(ExpenseId::from_uuid)?;
    let response = state
        .ledger
        .get_expense(GetExpenseRequest { expense_id })
        .await?;
    Ok(web::Json(ExpenseBody::from(response)))
}

#[cfg(test)]
#[path = "expenses_tests.rs"]
mod tests;
