use inv_core::InventoryItem;

use serde::Serialize;

/// Inventory item as returned by the REST API
#[derive(Debug, Clone, Serialize)]
pub struct ItemDto {
    pub id: i32,
    pub name: String,
    pub quantity: i32,
    /// RFC 3339
    pub updated_at: String,
}

impl From<InventoryItem> for ItemDto {
    fn from(item: InventoryItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            quantity: item.quantity,
            updated_at: item.updated_at.to_rfc3339(),
        }
    }
}
