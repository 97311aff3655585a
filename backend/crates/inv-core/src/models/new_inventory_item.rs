use crate::{CoreError, ErrorLocation, Result};

use std::panic::Location;

use serde::Deserialize;

pub const MAX_NAME_LENGTH: usize = 255;

/// Input for creating an inventory record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewInventoryItem {
    pub name: String,
    pub quantity: i32,
}

impl NewInventoryItem {
    pub fn new(name: impl Into<String>, quantity: i32) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }

    /// Trim the name and check both fields.
    #[track_caller]
    pub fn validated(self) -> Result<Self> {
        let name = self.name.trim().to_string();

        if name.is_empty() {
            return Err(CoreError::Validation {
                field: "name",
                message: "name cannot be empty".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(CoreError::Validation {
                field: "name",
                message: format!("name must be at most {MAX_NAME_LENGTH} characters"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        validate_quantity(self.quantity)?;

        Ok(Self {
            name,
            quantity: self.quantity,
        })
    }
}

#[track_caller]
pub fn validate_quantity(quantity: i32) -> Result<()> {
    if quantity < 0 {
        return Err(CoreError::Validation {
            field: "quantity",
            message: format!("quantity cannot be negative, got {quantity}"),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    Ok(())
}
