use crate::Result;

use inv_core::{InventoryItem, NewInventoryItem, validate_quantity};

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

/// CRUD over the `inventory` table.
///
/// Every mutation fires the `inventory_notify` trigger, which publishes the
/// changed row on the relay channel.
#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, item: NewInventoryItem) -> Result<InventoryItem> {
        let item = item.validated()?;

        let row = sqlx::query(
            r#"
              INSERT INTO inventory (name, quantity)
              VALUES ($1, $2)
              RETURNING id, name, quantity, updated_at
              "#,
        )
        .bind(&item.name)
        .bind(item.quantity)
        .fetch_one(&self.pool)
        .await?;

        let created = Self::map_row(&row)?;
        log::debug!("Created inventory item {}", created.id);
        Ok(created)
    }

    pub async fn find_all(&self) -> Result<Vec<InventoryItem>> {
        let rows = sqlx::query(
            r#"
              SELECT id, name, quantity, updated_at
              FROM inventory
              ORDER BY id ASC
              "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<InventoryItem>> {
        let row = sqlx::query(
            r#"
              SELECT id, name, quantity, updated_at
              FROM inventory
              WHERE id = $1
              "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    /// Returns `None` when no record has this id.
    pub async fn update_quantity(&self, id: i32, quantity: i32) -> Result<Option<InventoryItem>> {
        validate_quantity(quantity)?;

        let row = sqlx::query(
            r#"
              UPDATE inventory
              SET quantity = $2
              WHERE id = $1
              RETURNING id, name, quantity, updated_at
              "#,
        )
        .bind(id)
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    /// Returns whether a record was removed.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM inventory WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    fn map_row(row: &PgRow) -> Result<InventoryItem> {
        Ok(InventoryItem {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            quantity: row.try_get("quantity")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
