use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use finance_assistant::AppState;
use finance_assistant::api::{MemoryTransport, Method, Transport};
use finance_assistant::config::AppConfig;
use finance_assistant::server::build_router;
use serde_json::json;

fn setup() -> (TestServer, Arc<MemoryTransport>) {
    let config = AppConfig::load_from_args(["finance-assistant"]).expect("default config");
    let transport = Arc::new(MemoryTransport::new());
    let state = AppState::new(
        Arc::new(config),
        Arc::clone(&transport) as Arc<dyn Transport>,
    );
    let server = TestServer::new(build_router(state)).expect("test server");
    (server, transport)
}

#[tokio::test]
async fn healthz_answers_ok() {
    let (server, _) = setup();
    let response = server.get("/healthz").await;
    response.assert_status_ok();
    response.assert_text("ok");
}

#[tokio::test]
async fn pages_render_without_the_api() {
    let (server, _) = setup();
    for path in ["/", "/dashboard", "/dashboard/family", "/dashboard/subscription"] {
        let response = server.get(path).await;
        response.assert_status_ok();
        assert!(response.text().contains("<!DOCTYPE html>"), "{path}");
    }
}

#[tokio::test]
async fn unreachable_api_renders_fallback_card() {
    let (server, transport) = setup();
    let response = server.get("/ui/cards/balance-card?surface=dashboard").await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains(r#"data-card="balance-card""#));
    assert!(html.contains("Couldn't refresh this card."));
    assert!(html.contains("/ui/cards/balance-card?surface=dashboard"));
    assert_eq!(transport.count(Method::Get, "/api/finance/summary"), 1);
}

#[tokio::test]
async fn unknown_card_is_not_found() {
    let (server, _) = setup();
    server
        .get("/ui/cards/horoscope")
        .expect_failure()
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_sheet_rerenders_without_request() {
    let (server, transport) = setup();
    let response = server
        .post("/ui/sheets/budget")
        .form(&[("category", ""), ("amount", "120"), ("period", "monthly")])
        .await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains(r#"data-sheet="budget""#));
    assert!(html.contains("Category is required"));
    assert!(response.maybe_header("hx-trigger").is_none());
    assert_eq!(transport.total(), 0);
}

#[tokio::test]
async fn saved_sheet_closes_and_fires_update() {
    let (server, transport) = setup();
    transport.respond(
        Method::Post,
        "/api/finance/budgets",
        json!({ "budget": { "id": "b1", "category": "Groceries", "amount": 120, "currency": "BHD" } }),
    );
    let response = server
        .post("/ui/sheets/budget")
        .form(&[("category", "Groceries"), ("amount", "120"), ("period", "monthly")])
        .await;
    response.assert_status_ok();
    response.assert_header("hx-trigger", "finance-updated");
    response.assert_text("");
    assert_eq!(transport.count(Method::Post, "/api/finance/budgets"), 1);
}

#[tokio::test]
async fn set_budget_action_appends_a_card() {
    let (server, transport) = setup();
    transport.respond(
        Method::Post,
        "/api/finance/budgets",
        json!({ "budget": { "id": "b9", "category": "Dining", "amount": 180, "currency": "BHD" } }),
    );
    let response = server
        .post("/ui/chat/actions")
        .form(&[
            ("session_id", "s1"),
            ("action", "set-budget"),
            ("data", r#"{"category":"Dining","amount":180}"#),
        ])
        .await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("Your Dining budget is set"));
    assert!(html.contains(r#"data-card="budget-card""#));
    assert_eq!(transport.count(Method::Post, "/api/finance/budgets"), 1);
}

#[tokio::test]
async fn unknown_action_is_rejected() {
    let (server, transport) = setup();
    server
        .post("/ui/chat/actions")
        .form(&[("session_id", "s1"), ("action", "launch-rocket")])
        .expect_failure()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(transport.total(), 0);
}

#[tokio::test]
async fn dashboard_navigation_redirects() {
    let (server, _) = setup();
    let response = server
        .post("/ui/chat/actions")
        .form(&[
            ("action", "open-dashboard"),
            ("data", r#"{"path":"/dashboard/family"}"#),
            ("surface", "dashboard"),
        ])
        .await;
    response.assert_status_ok();
    response.assert_header("hx-redirect", "/dashboard/family");
}

#[tokio::test]
async fn missing_goal_opens_notice_sheet() {
    let (server, transport) = setup();
    transport.respond(Method::Get, "/api/finance/savings-goals", json!({ "goals": [] }));
    let response = server.get("/ui/sheets/contribution?id=g404").await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains(r#"data-sheet="notice""#));
    assert!(html.contains("That savings goal no longer exists."));
}
