#![allow(dead_code)]

use axum::Router;
use axum::routing::get;
use axum_test::TestServer;
use chrono::{DateTime, TimeZone, Utc};
use dining_service::api::handlers::health_handler;
use dining_service::api::routes::dining_routes;
use dining_service::application::services::RetryPolicy;
use dining_service::domain::{Clock, FixedClock, RandomIdGenerator};
use dining_service::infrastructure::persistence::{
    InMemoryTableOrderRepository, InMemoryTableRepository,
};
use dining_service::state::AppState;
use serde_json::{Value, json};
use std::sync::Arc;

pub fn dinner_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 17, 19, 30, 0).unwrap()
}

pub fn create_test_state_with_clock(clock: Arc<dyn Clock>) -> AppState {
    AppState::new(
        Arc::new(InMemoryTableOrderRepository::new()),
        Arc::new(InMemoryTableRepository::new()),
        clock,
        Arc::new(RandomIdGenerator),
        RetryPolicy::default(),
    )
}

/// State whose stale writes are retried often enough for heavy contention.
pub fn create_contended_state(clock: Arc<dyn Clock>) -> AppState {
    AppState::new(
        Arc::new(InMemoryTableOrderRepository::new()),
        Arc::new(InMemoryTableRepository::new()),
        clock,
        Arc::new(RandomIdGenerator),
        RetryPolicy {
            max_retries: 10,
            base_delay_ms: 1,
        },
    )
}

pub fn create_test_state() -> AppState {
    create_test_state_with_clock(Arc::new(FixedClock(dinner_time())))
}

/// Dining routes and the health check, without the peer-address rate limiter.
pub fn test_server(state: AppState) -> TestServer {
    let app = Router::new()
        .route("/health", get(health_handler))
        .merge(dining_routes())
        .with_state(state);

    TestServer::new(app).unwrap()
}

pub async fn create_table(server: &TestServer, number: i64) {
    server
        .post("/tables")
        .json(&json!({ "tableId": number }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);
}

/// Opens an order at `table` and returns its id.
pub async fn start_order(server: &TestServer, table: i64, customers: i64) -> String {
    let response = server
        .post("/tableOrders")
        .json(&json!({ "tableId": table, "customersCount": customers }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let body = response.json::<Value>();
    body["id"].as_str().unwrap().to_string()
}

pub async fn add_item(server: &TestServer, order_id: &str, short_name: &str, how_many: i64) {
    server
        .post(&format!("/tableOrders/{order_id}"))
        .json(&json!({ "shortName": short_name, "howMany": how_many }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);
}
