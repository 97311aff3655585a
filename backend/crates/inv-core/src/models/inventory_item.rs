//! Inventory record as stored in the `inventory` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked stock record. `updated_at` is maintained by the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: i32,
    pub name: String,
    pub quantity: i32,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }
}
