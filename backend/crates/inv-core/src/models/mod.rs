pub mod inventory_item;
pub mod new_inventory_item;
