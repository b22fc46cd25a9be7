//! Handlers for table management endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::table::{CreateTableRequest, TableItem, TableListResponse};
use crate::domain::entities::TableStatus;
use crate::error::AppError;
use crate::state::AppState;

/// Registers a table.
///
/// # Endpoint
///
/// `POST /tables`
///
/// # Request Body
///
/// ```json
/// { "tableId": 1 }
/// ```
///
/// # Errors
///
/// Returns 400 if the number is not positive.
/// Returns 409 if the table already exists.
pub async fn create_table_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateTableRequest>,
) -> Result<(StatusCode, Json<TableItem>), AppError> {
    payload.validate()?;

    let table = state.table_service.create_table(payload.table_id).await?;

    let status = TableStatus {
        table,
        open_order_id: None,
    };

    Ok((StatusCode::CREATED, Json(status.into())))
}

/// Lists all tables with their occupancy.
///
/// # Endpoint
///
/// `GET /tables`
pub async fn table_list_handler(
    State(state): State<AppState>,
) -> Result<Json<TableListResponse>, AppError> {
    let tables = state.table_service.list_tables().await?;

    Ok(Json(TableListResponse {
        items: tables.into_iter().map(TableItem::from).collect(),
    }))
}

/// Returns a single table.
///
/// # Endpoint
///
/// `GET /tables/{tableId}`
///
/// # Errors
///
/// Returns 404 if the table does not exist.
pub async fn get_table_handler(
    Path(table_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<TableItem>, AppError> {
    let status = state.table_service.get_table(table_id).await?;
    Ok(Json(status.into()))
}
