//! HTTP behaviour of the ledger API over the in-memory store.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use splitledger::Trace;
use splitledger::domain::{
    ExpenseCommandService, GroupId, GroupRoster, LedgerQueryService, MemberId, TRACE_ID_HEADER,
};
use splitledger::inbound::http::configure_api;
use splitledger::inbound::http::state::{HttpState, HttpStatePorts};
use splitledger::outbound::memory::InMemoryExpenseLedgerRepository;

struct Fixture {
    state: HttpState,
    group: GroupId,
    alice: MemberId,
    bob: MemberId,
    carol: MemberId,
}

#[fixture]
fn fixture() -> Fixture {
    let group = GroupId::random();
    let (alice, bob, carol) = (MemberId::random(), MemberId::random(), MemberId::random());
    let repo = Arc::new(
        InMemoryExpenseLedgerRepository::new()
            .with_group(GroupRoster::new(group, "Cabin", vec![alice, bob, carol])),
    );
    let state = HttpState::new(HttpStatePorts {
        expenses: Arc::new(ExpenseCommandService::new(
            Arc::clone(&repo),
            Arc::new(DefaultClock),
        )),
        ledger: Arc::new(LedgerQueryService::new(repo)),
    });
    Fixture {
        state,
        group,
        alice,
        bob,
        carol,
    }
}

macro_rules! init_app {
    ($state:expr) => {
        actix_test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .wrap(Trace)
                .configure(configure_api),
        )
        .await
    };
}

#[rstest]
#[actix_web::test]
async fn logged_expenses_are_reflected_in_balances(fixture: Fixture) {
    let app = init_app!(fixture.state.clone());
    let group = fixture.group;

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/groups/{group}/expenses"))
        .set_json(json!({
            "description": "Firewood",
            "amount": "30.00",
            "date": "2026-04-02",
            "paidById": fixture.alice.to_string(),
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = actix_test::read_body_json(response).await;
    let expense_id = created["expenseId"].as_str().expect("expense id").to_owned();

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/groups/{group}/expenses"))
        .set_json(json!({
            "description": "Groceries",
            "amount": "20.00",
            "date": "2026-04-03",
            "paidById": fixture.bob.to_string(),
            "participantIds": [fixture.alice.to_string(), fixture.bob.to_string()],
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/groups/{group}/balances"))
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;
    assert_eq!(
        body["balances"],
        json!([{
            "creditorId": fixture.alice.to_string(),
            "debtorId": fixture.carol.to_string(),
            "amount": "10.00",
            "updatedAt": body["balances"][0]["updatedAt"],
        }])
    );

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/expenses/{expense_id}"))
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;
    assert_eq!(body["description"], json!("Firewood"));
    assert_eq!(body["currency"], json!("USD"));
    let shares: Vec<&str> = body["shares"]
        .as_array()
        .expect("shares array")
        .iter()
        .filter_map(|share| share["amount"].as_str())
        .collect();
    assert_eq!(shares, vec!["10.00", "10.00", "10.00"]);
}

#[rstest]
#[actix_web::test]
async fn summary_lists_every_member(fixture: Fixture) {
    let app = init_app!(fixture.state.clone());
    let group = fixture.group;

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/groups/{group}/expenses"))
        .set_json(json!({
            "description": "Ferry",
            "amount": "10.00",
            "date": "2026-04-02",
            "paidById": fixture.carol.to_string(),
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/groups/{group}/balances/summary"))
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;
    let nets: Vec<&str> = body["members"]
        .as_array()
        .expect("members array")
        .iter()
        .filter_map(|member| member["net"].as_str())
        .collect();
    // Carol's share takes the remainder cent, so she is owed 6.66.
    assert_eq!(nets, vec!["-3.33", "-3.33", "6.66"]);

    let carol = &body["members"][2];
    assert_eq!(carol["memberId"], json!(fixture.carol.to_string()));
    assert_eq!(carol["paid"], json!("10.00"));
    assert_eq!(carol["share"], json!("3.34"));
    assert_eq!(carol["spendingNet"], json!("6.66"));
    assert_eq!(carol["settledPercent"], json!(100));
    assert_eq!(body["members"][0]["settledPercent"], json!(0));

    assert_eq!(
        body["totals"],
        json!({
            "expenseCount": 1,
            "totalSpend": "10.00",
            "averageExpense": "10.00",
            "outstandingTotal": "6.66",
            "activeBalances": 2,
        })
    );
}

#[rstest]
#[case::unknown_group(None, StatusCode::NOT_FOUND, "not_found")]
#[case::outsider_payer(Some("payer"), StatusCode::UNPROCESSABLE_ENTITY, "membership_violation")]
#[actix_web::test]
async fn rejected_expenses_report_structured_errors(
    fixture: Fixture,
    #[case] outsider: Option<&str>,
    #[case] status: StatusCode,
    #[case] code: &str,
) {
    let app = init_app!(fixture.state.clone());
    let group = match outsider {
        Some(_) => fixture.group,
        None => GroupId::random(),
    };
    let payer = match outsider {
        Some(_) => MemberId::random(),
        None => fixture.alice,
    };

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/groups/{group}/expenses"))
        .set_json(json!({
            "description": "Fuel",
            "amount": "12.00",
            "date": "2026-04-02",
            "paidById": payer.to_string(),
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), status);
    let trace_header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace id header");
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], json!(code));
    assert_eq!(body["traceId"], json!(trace_header));
}

#[rstest]
#[actix_web::test]
async fn zero_amounts_are_invalid_requests(fixture: Fixture) {
    let app = init_app!(fixture.state.clone());
    let group = fixture.group;

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/groups/{group}/expenses"))
        .set_json(json!({
            "description": "Nothing",
            "amount": "0.00",
            "date": "2026-04-02",
            "paidById": fixture.alice.to_string(),
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], json!("amount"));
}
