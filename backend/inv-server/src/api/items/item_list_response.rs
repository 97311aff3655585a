use crate::ItemDto;

use serde::Serialize;

/// List of items response
#[derive(Debug, Serialize)]
pub struct ItemListResponse {
    pub items: Vec<ItemDto>,
}
