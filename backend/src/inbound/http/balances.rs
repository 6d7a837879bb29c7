//! Group balance HTTP handlers.
//!
//! ```text
//! GET /api/v1/groups/{groupId}/balances
//! GET /api/v1/groups/{groupId}/balances/summary
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{BalanceSummaryResponse, GroupBalancesRequest, GroupBalancesResponse};
use crate::domain::{Balance, Error, GroupTotals, MemberPosition, MoneyError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::expenses::{GroupPath, parse_group_id};
use crate::inbound::http::state::HttpState;

/// One directed debt: `debtorId` owes `creditorId` the amount.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceBody {
    #[schema(format = "uuid")]
    pub creditor_id: String,
    #[schema(format = "uuid")]
    pub debtor_id: String,
    #[schema(example = "20.00")]
    pub amount: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<&Balance> for BalanceBody {
    fn from(value: &Balance) -> Self {
        Self {
            creditor_id: value.creditor_id().to_string(),
            debtor_id: value.debtor_id().to_string(),
            amount: value.amount().to_string(),
            updated_at: value.updated_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupBalancesResponseBody {
    #[schema(format = "uuid")]
    pub group_id: String,
    pub balances: Vec<BalanceBody>,
}

impl From<GroupBalancesResponse> for GroupBalancesResponseBody {
    fn from(value: GroupBalancesResponse) -> Self {
        Self {
            group_id: value.group_id.to_string(),
            balances: value.balances.iter().map(BalanceBody::from).collect(),
        }
    }
}

/// Totals for one member. `net` is positive when the member is owed money.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberPositionBody {
    #[schema(format = "uuid")]
    pub member_id: String,
    pub owed: String,
    pub owes: String,
    pub net: String,
    /// Sum of the expenses the member paid.
    pub paid: String,
    /// Sum of the member's shares.
    pub share: String,
    /// `paid - share`.
    pub spending_net: String,
    /// Share of the member's allocation covered by their payments, 0 to 100.
    pub settled_percent: u8,
    pub settled: bool,
}

impl TryFrom<&MemberPosition> for MemberPositionBody {
    type Error = Error;

    fn try_from(value: &MemberPosition) -> Result<Self, Self::Error> {
        let overflow = |err: MoneyError| Error::internal(format!("member position overflow: {err}"));
        let net = value.net().map_err(overflow)?;
        let spending_net = value.spending_net().map_err(overflow)?;
        Ok(Self {
            member_id: value.member_id.to_string(),
            owed: value.owed.to_string(),
            owes: value.owes.to_string(),
            net: net.to_string(),
            paid: value.paid.to_string(),
            share: value.share.to_string(),
            spending_net: spending_net.to_string(),
            settled_percent: value.settled_percent(),
            settled: value.is_settled(),
        })
    }
}

/// Group-wide spending and ledger figures.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupTotalsBody {
    pub expense_count: u64,
    pub total_spend: String,
    pub average_expense: String,
    /// Sum of every outstanding balance.
    pub outstanding_total: String,
    pub active_balances: u64,
}

impl From<GroupTotals> for GroupTotalsBody {
    fn from(value: GroupTotals) -> Self {
        Self {
            expense_count: value.expense_count,
            total_spend: value.total_spend.to_string(),
            average_expense: value.average_expense.to_string(),
            outstanding_total: value.outstanding_total.to_string(),
            active_balances: value.active_balances,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSummaryResponseBody {
    #[schema(format = "uuid")]
    pub group_id: String,
    pub totals: GroupTotalsBody,
    pub members: Vec<MemberPositionBody>,
}

impl TryFrom<BalanceSummaryResponse> for BalanceSummaryResponseBody {
    type Error = Error;

    fn try_from(value: BalanceSummaryResponse) -> Result<Self, Self::Error> {
        Ok(Self {
            group_id: value.group_id.to_string(),
            totals: GroupTotalsBody::from(value.totals),
            members: value
                .members
                .iter()
                .map(MemberPositionBody::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

/// List the group's outstanding balances, largest first.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{groupId}/balances",
    params(
        ("groupId" = String, Path, description = "Group identifier")
    ),
    responses(
        (status = 200, description = "Group balances", body = GroupBalancesResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Group not found", body = Error),
        (status = 503, description = "Ledger store unavailable", body = Error)
    ),
    tags = ["balances"],
    operation_id = "listGroupBalances"
)]
#[get("/groups/{groupId}/balances")]
pub async fn list_balances(
    state: web::Data<HttpState>,
    path: web::Path<GroupPath>,
) -> ApiResult<web::Json<GroupBalancesResponseBody>> {
    let group_id = parse_group_id(path.into_inner())?;
    let response = state
        .ledger
        .group_balances(GroupBalancesRequest { group_id })
        .await?;
    Ok(web::Json(GroupBalancesResponseBody::from(response)))
}

/// Summarise each member's spending and position, plus group totals.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{groupId}/balances/summary",
    params(
        ("groupId" = String, Path, description = "Group identifier")
    ),
    responses(
        (status = 200, description = "Member positions", body = BalanceSummaryResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Group not found", body = Error),
        (status = 503, description = "Ledger store unavailable", body = Error)
    ),
    tags = ["balances"],
    operation_id = "summariseGroupBalances"
)]
#[get("/groups/{groupId}/balances/summary")]
pub async fn balance_summary(
    state: web::Data<HttpState>,
    path: web::Path<GroupPath>,
) -> ApiResult<web::Json<BalanceSummaryResponseBody>> {
    let group_id = parse_group_id(path.into_inner())?;
    let response = state
        .ledger
        .balance_summary(GroupBalancesRequest { group_id })
        .await?;
    Ok(web::Json(BalanceSummaryResponseBody::try_from(response)?))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use chrono::{TimeZone, Utc};
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::ports::MockLedgerQuery;
    use crate::domain::{BalanceKey, GroupId, MemberId, Money};
    use crate::inbound::http::state::HttpStatePorts;

    async fn get_json(ledger: MockLedgerQuery, uri: &str) -> (StatusCode, Value) {
        let ports = HttpStatePorts {
            ledger: Arc::new(ledger),
            ..HttpStatePorts::default()
        };
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(HttpState::new(ports)))
                .service(
                    web::scope("/api/v1")
                        .service(balance_summary)
                        .service(list_balances),
                ),
        )
        .await;
        let request = actix_test::TestRequest::get().uri(uri).to_request();
        let response = actix_test::call_service(&app, request).await;
        let status = response.status();
        (status, actix_test::read_body_json(response).await)
    }

    #[actix_web::test]
    async fn balances_are_rendered_as_decimal_strings() {
        let group_id = GroupId::random();
        let (creditor, debtor) = (MemberId::random(), MemberId::random());
        let updated_at = Utc
            .with_ymd_and_hms(2026, 4, 2, 18, 0, 0)
            .single()
            .expect("valid timestamp");
        let balance = Balance::new(
            BalanceKey::new(group_id, creditor, debtor),
            Money::from_cents(2000),
            updated_at,
        )
        .expect("valid balance");

        let mut ledger = MockLedgerQuery::new();
        ledger
            .expect_group_balances()
            .withf(move |request| request.group_id == group_id)
            .return_once(move |request| {
                Ok(GroupBalancesResponse {
                    group_id: request.group_id,
                    balances: vec![balance],
                })
            });

        let (status, body) = get_json(ledger, &format!("/api/v1/groups/{group_id}/balances")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["balances"][0]["amount"], json!("20.00"));
        assert_eq!(body["balances"][0]["creditorId"], json!(creditor.to_string()));
        assert_eq!(body["balances"][0]["debtorId"], json!(debtor.to_string()));
    }

    #[actix_web::test]
    async fn summary_reports_positions_and_group_totals() {
        let group_id = GroupId::random();
        let (a, b) = (MemberId::random(), MemberId::random());
        let mut ledger = MockLedgerQuery::new();
        ledger.expect_balance_summary().return_once(move |request| {
            Ok(BalanceSummaryResponse {
                group_id: request.group_id,
                totals: GroupTotals {
                    expense_count: 1,
                    total_spend: Money::from_cents(2000),
                    average_expense: Money::from_cents(2000),
                    outstanding_total: Money::from_cents(1000),
                    active_balances: 1,
                },
                members: vec![
                    MemberPosition {
                        member_id: a,
                        owed: Money::from_cents(1000),
                        owes: Money::ZERO,
                        paid: Money::from_cents(2000),
                        share: Money::from_cents(1000),
                    },
                    MemberPosition {
                        member_id: b,
                        owed: Money::ZERO,
                        owes: Money::from_cents(1000),
                        paid: Money::ZERO,
                        share: Money::from_cents(1000),
                    },
                ],
            })
        });

        let (status, body) =
            get_json(ledger, &format!("/api/v1/groups/{group_id}/balances/summary")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["members"][0]["net"], json!("10.00"));
        assert_eq!(body["members"][0]["paid"], json!("20.00"));
        assert_eq!(body["members"][0]["spendingNet"], json!("10.00"));
        assert_eq!(body["members"][0]["settledPercent"], json!(100));
        assert_eq!(body["members"][1]["net"], json!("-10.00"));
        assert_eq!(body["members"][1]["share"], json!("10.00"));
        assert_eq!(body["members"][1]["settledPercent"], json!(0));
        assert_eq!(body["members"][1]["settled"], json!(false));
        assert_eq!(body["totals"]["expenseCount"], json!(1));
        assert_eq!(body["totals"]["totalSpend"], json!("20.00"));
        assert_eq!(body["totals"]["averageExpense"], json!("20.00"));
        assert_eq!(body["totals"]["outstandingTotal"], json!("10.00"));
        assert_eq!(body["totals"]["activeBalances"], json!(1));
    }

    #[actix_web::test]
    async fn unknown_groups_are_not_found() {
        let mut ledger = MockLedgerQuery::new();
        ledger
            .expect_group_balances()
            .return_once(|_| Err(Error::not_found("group missing")));

        let (status, body) = get_json(
            ledger,
            &format!("/api/v1/groups/{}/balances", GroupId::random()),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], json!("not_found"));
    }
}
