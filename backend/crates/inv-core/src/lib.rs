pub mod error;
pub mod models;

#[cfg(test)]
mod tests;

pub use error::{CoreError, Result};
pub use models::inventory_item::InventoryItem;
pub use models::new_inventory_item::{MAX_NAME_LENGTH, NewInventoryItem, validate_quantity};

pub use error_location::ErrorLocation;
