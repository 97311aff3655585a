mod inventory_item;
mod new_inventory_item;
