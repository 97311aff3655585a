use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    /// Item name (required, trimmed)
    pub name: String,

    /// Units on hand; must not be negative
    pub quantity: i32,
}
