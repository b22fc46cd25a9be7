mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
async fn test_create_table() {
    let server = common::test_server(common::create_test_state());

    let response = server.post("/tables").json(&json!({ "tableId": 1 })).await;

    response.assert_status(StatusCode::CREATED);
    let json = response.json::<Value>();
    assert_eq!(json["number"], 1);
    assert_eq!(json["taken"], false);
    assert!(json["tableOrderId"].is_null());
}

#[tokio::test]
async fn test_create_duplicate_table_is_conflict() {
    let server = common::test_server(common::create_test_state());
    common::create_table(&server, 1).await;

    let response = server.post("/tables").json(&json!({ "tableId": 1 })).await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["error"]["code"], "conflict");
}

#[tokio::test]
async fn test_create_table_with_invalid_number() {
    let server = common::test_server(common::create_test_state());

    let response = server.post("/tables").json(&json!({ "tableId": 0 })).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_get_table_shows_open_order() {
    let server = common::test_server(common::create_test_state());
    common::create_table(&server, 3).await;
    let order_id = common::start_order(&server, 3, 2).await;

    let response = server.get("/tables/3").await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["taken"], true);
    assert_eq!(json["tableOrderId"], order_id);
}

#[tokio::test]
async fn test_get_unknown_table() {
    let server = common::test_server(common::create_test_state());

    let response = server.get("/tables/42").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_list_tables_in_number_order() {
    let server = common::test_server(common::create_test_state());
    common::create_table(&server, 5).await;
    common::create_table(&server, 2).await;
    common::start_order(&server, 5, 4).await;

    let response = server.get("/tables").await;

    response.assert_status_ok();
    let items = response.json::<Value>()["items"].as_array().unwrap().clone();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["number"], 2);
    assert_eq!(items[0]["taken"], false);
    assert_eq!(items[1]["number"], 5);
    assert_eq!(items[1]["taken"], true);
}

#[tokio::test]
async fn test_table_is_free_again_after_billing() {
    let server = common::test_server(common::create_test_state());
    common::create_table(&server, 1).await;
    let order_id = common::start_order(&server, 1, 2).await;

    server
        .post(&format!("/tableOrders/{order_id}/bill"))
        .await
        .assert_status_ok();

    let json = server.get("/tables/1").await.json::<Value>();
    assert_eq!(json["taken"], false);
    assert!(json["tableOrderId"].is_null());
}
