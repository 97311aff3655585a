use crate::{CoreError, MAX_NAME_LENGTH, NewInventoryItem, validate_quantity};

#[test]
fn test_valid_item_passes_and_name_is_trimmed() {
    let item = NewInventoryItem::new("  Bolts  ", 10).validated().unwrap();

    assert_eq!(item.name, "Bolts");
    assert_eq!(item.quantity, 10);
}

#[test]
fn test_blank_name_is_rejected() {
    let result = NewInventoryItem::new("   ", 1).validated();

    assert!(matches!(
        result,
        Err(CoreError::Validation { field: "name", .. })
    ));
}

#[test]
fn test_name_over_limit_is_rejected() {
    let result = NewInventoryItem::new("x".repeat(MAX_NAME_LENGTH + 1), 1).validated();

    assert!(matches!(
        result,
        Err(CoreError::Validation { field: "name", .. })
    ));
}

#[test]
fn test_name_at_limit_is_accepted() {
    let result = NewInventoryItem::new("x".repeat(MAX_NAME_LENGTH), 1).validated();

    assert!(result.is_ok());
}

#[test]
fn test_negative_quantity_is_rejected() {
    let result = NewInventoryItem::new("Nuts", -1).validated();

    assert!(matches!(
        result,
        Err(CoreError::Validation {
            field: "quantity",
            ..
        })
    ));
}

#[test]
fn test_zero_quantity_is_valid() {
    assert!(validate_quantity(0).is_ok());
}
