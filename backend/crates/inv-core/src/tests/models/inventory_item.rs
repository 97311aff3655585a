use crate::InventoryItem;

use chrono::Utc;

fn item(quantity: i32) -> InventoryItem {
    InventoryItem {
        id: 1,
        name: "Widget".to_string(),
        quantity,
        updated_at: Utc::now(),
    }
}

#[test]
fn test_item_with_zero_quantity_is_out_of_stock() {
    assert!(item(0).is_out_of_stock());
    assert!(!item(3).is_out_of_stock());
}

#[test]
fn test_item_serializes_with_all_fields() {
    let json = serde_json::to_value(item(5)).unwrap();

    assert_eq!(json["id"], 1);
    assert_eq!(json["name"], "Widget");
    assert_eq!(json["quantity"], 5);
    assert!(json["updated_at"].is_string());
}
