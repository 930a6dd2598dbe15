use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartItem {
    pub id: Uuid,
    pub email: String,
    #[serde(rename = "productId")]
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl CartItem {
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Vec<CartItem>, DatabaseError> {
        let items = sqlx::query_as::<_, CartItem>(
            "SELECT * FROM cart_items WHERE email = $1 ORDER BY created_at ASC",
        )
        .bind(email)
        .fetch_all(pool)
        .await?;
        Ok(items)
    }

    pub async fn exists(pool: &PgPool, email: &str, product_id: Uuid) -> Result<bool, DatabaseError> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM cart_items WHERE email = $1 AND product_id = $2",
        )
        .bind(email)
        .bind(product_id)
        .fetch_one(pool)
        .await?;
        Ok(found > 0)
    }

    /// Inserts a cart row. Returns None when the (email, product) pair is
    /// already present; the unique index makes this hold under concurrent
    /// adds, not just for the advisory pre-check.
    pub async fn insert(
        pool: &PgPool,
        email: &str,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Option<CartItem>, DatabaseError> {
        let item = sqlx::query_as::<_, CartItem>(
            "INSERT INTO cart_items (email, product_id, quantity) VALUES ($1, $2, $3) \
             ON CONFLICT (email, product_id) DO NOTHING RETURNING *",
        )
        .bind(email)
        .bind(product_id)
        .bind(quantity)
        .fetch_optional(pool)
        .await?;
        Ok(item)
    }

    /// Sets the quantity on a row owned by `email`. Returns the number of
    /// rows touched (0 when the id is unknown or owned by someone else).
    pub async fn update_quantity(
        pool: &PgPool,
        id: Uuid,
        email: &str,
        quantity: i32,
    ) -> Result<u64, DatabaseError> {
        let result = sqlx::query("UPDATE cart_items SET quantity = $1 WHERE id = $2 AND email = $3")
            .bind(quantity)
            .bind(id)
            .bind(email)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(pool: &PgPool, id: Uuid, email: &str) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND email = $2")
            .bind(id)
            .bind(email)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
