pub mod api;
pub mod error;
pub mod health;
pub mod logger;
pub mod relay;
pub mod routes;

#[cfg(test)]
mod tests;

pub use api::{
    delete_response::DeleteResponse,
    error::ApiError,
    error::Result as ApiResult,
    items::{
        create_item_request::CreateItemRequest,
        item_dto::ItemDto,
        item_list_response::ItemListResponse,
        item_response::ItemResponse,
        items::{create_item, delete_item, get_item, list_items, update_item},
        update_item_request::UpdateItemRequest,
    },
};
pub use error::{Result as ServerErrorResult, ServerError};
pub use relay::{backoff::Backoff, relay_context::RelayContext};
pub use routes::build_router;
