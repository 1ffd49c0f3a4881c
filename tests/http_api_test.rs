use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::fs::File;
use teamtab::application::service::LedgerService;
use teamtab::infrastructure::in_memory::InMemoryLedgerStore;
use teamtab::interfaces::http::app;
use teamtab::interfaces::http::state::AppState;
use teamtab::interfaces::roster::read_roster;
use tower::ServiceExt;

async fn test_app() -> Router {
    let service = LedgerService::new(Box::new(InMemoryLedgerStore::new()));
    let roster = read_roster(File::open("tests/fixtures/roster.json").unwrap()).unwrap();
    service.sync_roster(roster).await.unwrap();
    app(AppState::new(service))
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn post(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn login(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        post(
            "/login",
            None,
            json!({ "username": username, "password": format!("{username}-pw") }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_needs_no_token() {
    let app = test_app().await;
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn login_returns_identity() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        post("/login", None, json!({ "username": "bob", "password": "bob-pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], 2);
    assert_eq!(body["full_name"], "Bob Roe");
    assert!(!body["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        post("/login", None, json!({ "username": "bob", "password": "alice-pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn ledger_routes_require_a_token() {
    let app = test_app().await;
    for uri in ["/dashboard", "/expenses", "/settlements/history"] {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }

    let (status, _) = send(&app, get("/dashboard", "forged")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expense_then_payment_flow() {
    let app = test_app().await;
    let alice = login(&app, "alice").await;
    let bob = login(&app, "bob").await;

    // Alice pays for dinner
    let (status, expense) = send(
        &app,
        post(
            "/expenses",
            Some(&alice),
            json!({ "description": "Team dinner", "amount": 30 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(expense["description"], "Team dinner");
    assert_eq!(expense["payer"], "Alice Doe");
    assert_eq!(expense["is_mine"], true);
    assert_eq!(expense["amount"].as_f64(), Some(30.0));
    assert_eq!(expense["date"].as_str().unwrap().len(), 10);

    let (status, dashboard) = send(&app, get("/dashboard", &alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["my_balance"].as_f64(), Some(20.0));
    assert_eq!(dashboard["expenses"][0]["desc"], "Team dinner");
    assert_eq!(dashboard["expenses"][0]["payer"], "Alice Doe");
    let suggested = dashboard["suggested_payments"].as_array().unwrap();
    assert_eq!(suggested.len(), 2);
    assert_eq!(suggested[0]["from"], "Bob Roe");
    assert_eq!(suggested[0]["to"], "Alice Doe");
    assert_eq!(suggested[0]["payer_id"], 2);
    assert_eq!(suggested[0]["receiver_id"], 1);
    assert_eq!(suggested[0]["amount"].as_f64(), Some(10.0));
    assert_eq!(suggested[1]["from"], "Carol Poe");

    // Bob settles his part
    let (status, payment) = send(
        &app,
        post(
            "/settlements",
            Some(&bob),
            json!({ "receiver_id": 1, "amount": 10.0 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payment["payer"], "Bob Roe");
    assert_eq!(payment["receiver"], "Alice Doe");
    assert_eq!(payment["amount"].as_f64(), Some(10.0));

    let (_, dashboard) = send(&app, get("/dashboard", &alice)).await;
    assert_eq!(dashboard["my_balance"].as_f64(), Some(10.0));
    assert_eq!(
        dashboard["suggested_payments"],
        json!([{ "from": "Carol Poe", "to": "Alice Doe", "amount": 10.0, "payer_id": 3, "receiver_id": 1 }])
    );

    let (_, dashboard) = send(&app, get("/dashboard", &bob)).await;
    assert_eq!(dashboard["my_balance"].as_f64(), Some(0.0));

    let (status, history) = send(&app, get("/settlements/history", &alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["payer"], "Bob Roe");
}

#[tokio::test]
async fn expense_filter() {
    let app = test_app().await;
    let alice = login(&app, "alice").await;
    let bob = login(&app, "bob").await;

    for (token, description) in [(&alice, "Taxi"), (&bob, "Lunch")] {
        let (status, _) = send(
            &app,
            post(
                "/expenses",
                Some(token),
                json!({ "description": description, "amount": 12.5 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, all) = send(&app, get("/expenses", &bob)).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
    // Newest first
    assert_eq!(all[0]["description"], "Lunch");
    assert_eq!(all[0]["is_mine"], true);
    assert_eq!(all[1]["is_mine"], false);

    let (_, mine) = send(&app, get("/expenses?filter=mine", &bob)).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["description"], "Lunch");
}

#[tokio::test]
async fn string_amounts_are_accepted() {
    let app = test_app().await;
    let alice = login(&app, "alice").await;
    let bob = login(&app, "bob").await;

    let (status, expense) = send(
        &app,
        post(
            "/expenses",
            Some(&alice),
            json!({ "description": "Coffee beans", "amount": "12.50" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(expense["amount"].as_f64(), Some(12.5));

    let (status, payment) = send(
        &app,
        post(
            "/settlements",
            Some(&bob),
            json!({ "receiver_id": 1, "amount": "4.17" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payment["amount"].as_f64(), Some(4.17));

    let (_, dashboard) = send(&app, get("/dashboard", &bob)).await;
    assert_eq!(dashboard["my_balance"].as_f64(), Some(0.0));
}

#[tokio::test]
async fn shared_with_limits_the_split() {
    let app = test_app().await;
    let alice = login(&app, "alice").await;
    let carol = login(&app, "carol").await;

    let (status, _) = send(
        &app,
        post(
            "/expenses",
            Some(&alice),
            json!({ "description": "Tickets", "amount": 20, "shared_with": [1, 2] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, dashboard) = send(&app, get("/dashboard", &carol)).await;
    assert_eq!(dashboard["my_balance"].as_f64(), Some(0.0));
    assert_eq!(dashboard["suggested_payments"][0]["from"], "Bob Roe");
}

#[tokio::test]
async fn invalid_requests_are_422() {
    let app = test_app().await;
    let alice = login(&app, "alice").await;

    let cases = [
        ("/settlements", json!({ "receiver_id": 1, "amount": 5 })),
        ("/settlements", json!({ "receiver_id": 42, "amount": 5 })),
        ("/settlements", json!({ "receiver_id": 2, "amount": -5 })),
        ("/settlements", json!({ "receiver_id": 2, "amount": "lots" })),
        ("/expenses", json!({ "description": "", "amount": 5 })),
        ("/expenses", json!({ "description": "Gum", "amount": 0.001 })),
        ("/expenses", json!({ "amount": 5 })),
        ("/expenses", json!({ "description": "Yacht", "amount": "70000000000000000000000000000" })),
        ("/settlements", json!({ "receiver_id": 2, "amount": 1e13 })),
    ];
    for (uri, body) in cases {
        let (status, response) = send(&app, post(uri, Some(&alice), body.clone())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri} {body}");
        assert_eq!(response["error"]["code"], "VALIDATION_ERROR");
    }

    let (_, history) = send(&app, get("/settlements/history", &alice)).await;
    assert_eq!(history, json!([]));
    let (_, expenses) = send(&app, get("/expenses", &alice)).await;
    assert_eq!(expenses, json!([]));
}
