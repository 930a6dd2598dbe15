use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;

/// An order stores the client payload verbatim; `payload` fields are
/// flattened back to the top level on the wire so the stored document
/// round-trips the way it was submitted.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_email: String,
    #[serde(flatten)]
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub async fn insert(pool: &PgPool, user_email: &str, payload: Value) -> Result<Order, DatabaseError> {
        let order = sqlx::query_as::<_, Order>(
            "INSERT INTO orders (user_email, payload) VALUES ($1, $2) RETURNING *",
        )
        .bind(user_email)
        .bind(payload)
        .fetch_one(pool)
        .await?;
        Ok(order)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Order>, DatabaseError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(order)
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Order>, DatabaseError> {
        let orders = sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY created_at DESC")
            .fetch_all(pool)
            .await?;
        Ok(orders)
    }

    pub async fn list_for_email(pool: &PgPool, email: &str) -> Result<Vec<Order>, DatabaseError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE user_email = $1 ORDER BY created_at DESC",
        )
        .bind(email)
        .fetch_all(pool)
        .await?;
        Ok(orders)
    }
}
