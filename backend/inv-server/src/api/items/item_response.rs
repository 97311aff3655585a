use crate::ItemDto;

use serde::Serialize;

/// Single item response
#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub item: ItemDto,
}
