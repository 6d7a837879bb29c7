//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer together
//! with the request and response bodies they use. The generated document is
//! served by Swagger UI in debug builds and exported by the `openapi-dump`
//! binary.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::balances::{
    BalanceBody, BalanceSummaryResponseBody, GroupBalancesResponseBody, GroupTotalsBody,
    MemberPositionBody,
};
use crate::inbound::http::expenses::{
    ExpenseBody, LogExpenseRequestBody, LogExpenseResponseBody, ShareBody,
};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Split ledger API",
        description = "Log shared expenses and read the simplified balances between group members."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::expenses::log_expense,
        crate::inbound::http::expenses::get_expense,
        crate::inbound::http::balances::list_balances,
        crate::inbound::http::balances::balance_summary,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        LogExpenseRequestBody,
        LogExpenseResponseBody,
        ShareBody,
        ExpenseBody,
        BalanceBody,
        GroupBalancesResponseBody,
        MemberPositionBody,
        GroupTotalsBody,
        BalanceSummaryResponseBody,
    )),
    tags(
        (name = "expenses", description = "Logging and reading expenses"),
        (name = "balances", description = "Outstanding balances between members"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI document structure.

    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    use super::*;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("/api/v1/groups/{groupId}/expenses")]
    #[case("/api/v1/expenses/{expenseId}")]
    #[case("/api/v1/groups/{groupId}/balances")]
    #[case("/api/v1/groups/{groupId}/balances/summary")]
    #[case("/health/ready")]
    fn openapi_lists_every_endpoint(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[rstest]
    fn log_expense_request_schema_has_payload_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas
            .get("LogExpenseRequestBody")
            .expect("LogExpenseRequestBody schema");

        for field in ["description", "amount", "date", "paidById", "participantIds"] {
            assert_object_schema_has_field(schema, field);
        }
    }
}
