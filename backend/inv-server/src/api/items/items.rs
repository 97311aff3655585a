//! Inventory item REST API handlers
//!
//! Handlers only touch the database. Change notifications reach WebSocket
//! clients through the database trigger and the relay, never from here.

use crate::{
    ApiError, ApiResult, CreateItemRequest, DeleteResponse, ItemDto, ItemListResponse,
    ItemResponse, UpdateItemRequest,
};

use inv_core::NewInventoryItem;
use inv_db::InventoryRepository;
use inv_ws::AppState;

use std::panic::Location;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use error_location::ErrorLocation;

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/v1/items
pub async fn create_item(
    State(state): State<AppState>,
    Json(req): Json<CreateItemRequest>,
) -> ApiResult<(StatusCode, Json<ItemResponse>)> {
    let repo = InventoryRepository::new(state.pool.clone());
    let item = repo
        .create(NewInventoryItem::new(req.name, req.quantity))
        .await?;

    log::info!("Created inventory item {} ({}) via REST API", item.id, item.name);

    Ok((
        StatusCode::CREATED,
        Json(ItemResponse { item: item.into() }),
    ))
}

/// GET /api/v1/items
///
/// List all items ordered by id
pub async fn list_items(State(state): State<AppState>) -> ApiResult<Json<ItemListResponse>> {
    let repo = InventoryRepository::new(state.pool.clone());
    let items = repo.find_all().await?;

    Ok(Json(ItemListResponse {
        items: items.into_iter().map(ItemDto::from).collect(),
    }))
}

/// GET /api/v1/items/{id}
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ItemResponse>> {
    let item_id = parse_id(&id)?;

    let repo = InventoryRepository::new(state.pool.clone());
    let item = repo
        .find_by_id(item_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Item {item_id} not found")))?;

    Ok(Json(ItemResponse { item: item.into() }))
}

/// PUT /api/v1/items/{id}
///
/// Set the quantity of an existing item
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateItemRequest>,
) -> ApiResult<Json<ItemResponse>> {
    let item_id = parse_id(&id)?;

    let repo = InventoryRepository::new(state.pool.clone());
    let item = repo
        .update_quantity(item_id, req.quantity)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Item {item_id} not found")))?;

    log::info!(
        "Updated inventory item {} quantity to {} via REST API",
        item.id,
        item.quantity
    );

    Ok(Json(ItemResponse { item: item.into() }))
}

/// DELETE /api/v1/items/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let item_id = parse_id(&id)?;

    let repo = InventoryRepository::new(state.pool.clone());
    if !repo.delete(item_id).await? {
        return Err(ApiError::not_found(format!("Item {item_id} not found")));
    }

    log::info!("Deleted inventory item {item_id} via REST API");

    Ok(Json(DeleteResponse { deleted: true }))
}

// =============================================================================
// Helpers
// =============================================================================

#[track_caller]
fn parse_id(id: &str) -> ApiResult<i32> {
    id.parse::<i32>().map_err(|_| ApiError::Validation {
        message: format!("Invalid item id: '{id}'"),
        field: Some("id".into()),
        location: ErrorLocation::from(Location::caller()),
    })
}
