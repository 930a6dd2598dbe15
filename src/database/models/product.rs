use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub collection: String,
    pub category: String,
    pub availability: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub sale_price: Decimal,
    /// Open-ended document fields (images, sizes, description, ...).
    pub attributes: Value,
    pub created_at: DateTime<Utc>,
}

/// Admin create payload. Fields outside the fixed columns are collected
/// into `attributes`, mirroring the document-store habit of accepting
/// arbitrary extra fields.
#[derive(Debug, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub collection: String,
    pub category: String,
    #[serde(default = "default_availability")]
    pub availability: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub sale_price: Decimal,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

fn default_availability() -> bool {
    true
}

/// Admin partial-update payload; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub collection: Option<String>,
    pub category: Option<String>,
    pub availability: Option<bool>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub sale_price: Option<Decimal>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.collection.is_none()
            && self.category.is_none()
            && self.availability.is_none()
            && self.price.is_none()
            && self.sale_price.is_none()
            && self.attributes.is_empty()
    }
}

impl Product {
    pub async fn insert(pool: &PgPool, new: NewProduct) -> Result<Product, DatabaseError> {
        let product = sqlx::query_as::<_, Product>(
            "INSERT INTO products (name, collection, category, availability, price, sale_price, attributes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(new.name)
        .bind(new.collection)
        .bind(new.category)
        .bind(new.availability)
        .bind(new.price)
        .bind(new.sale_price)
        .bind(Value::Object(new.attributes))
        .fetch_one(pool)
        .await?;
        Ok(product)
    }

    /// Applies a partial update; extra fields are merged into `attributes`
    /// rather than replacing it. Returns None when the id is unknown.
    pub async fn update(pool: &PgPool, id: Uuid, patch: ProductPatch) -> Result<Option<Product>, DatabaseError> {
        let mut sets: Vec<String> = Vec::new();
        let mut idx = 1usize;

        macro_rules! set_clause {
            ($name:literal) => {{
                idx += 1;
                sets.push(format!(concat!($name, " = ${}"), idx));
            }};
        }

        if patch.name.is_some() {
            set_clause!("name");
        }
        if patch.collection.is_some() {
            set_clause!("collection");
        }
        if patch.category.is_some() {
            set_clause!("category");
        }
        if patch.availability.is_some() {
            set_clause!("availability");
        }
        if patch.price.is_some() {
            set_clause!("price");
        }
        if patch.sale_price.is_some() {
            set_clause!("sale_price");
        }
        if !patch.attributes.is_empty() {
            idx += 1;
            sets.push(format!("attributes = attributes || ${}", idx));
        }

        if sets.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        let sql = format!("UPDATE products SET {} WHERE id = $1 RETURNING *", sets.join(", "));
        let mut q = sqlx::query_as::<_, Product>(&sql).bind(id);
        if let Some(v) = patch.name {
            q = q.bind(v);
        }
        if let Some(v) = patch.collection {
            q = q.bind(v);
        }
        if let Some(v) = patch.category {
            q = q.bind(v);
        }
        if let Some(v) = patch.availability {
            q = q.bind(v);
        }
        if let Some(v) = patch.price {
            q = q.bind(v);
        }
        if let Some(v) = patch.sale_price {
            q = q.bind(v);
        }
        if !patch.attributes.is_empty() {
            q = q.bind(Value::Object(patch.attributes));
        }

        let product = q.fetch_optional(pool).await?;
        Ok(product)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Product>, DatabaseError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(product)
    }
}
