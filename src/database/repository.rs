use serde::Serialize;
use sqlx::{self, postgres::PgRow, FromRow, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::query_builder::{GroupCount, QueryBuilder};
use crate::filter::FilterData;

/// Thin typed facade over one table: find / count / group-count / delete
/// driven by JSON filter documents. Inserts and updates live on the model
/// types, where the column lists are known.
pub struct Repository<T> {
    table_name: String,
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin + Serialize,
{
    pub fn new(table_name: impl Into<String>, pool: PgPool) -> Self {
        Self {
            table_name: table_name.into(),
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_any(&self, filter_data: FilterData) -> Result<Vec<T>, DatabaseError> {
        QueryBuilder::<T>::new(&self.table_name)?
            .filter(filter_data)?
            .select_all(&self.pool)
            .await
    }

    pub async fn select_one(&self, filter_data: FilterData) -> Result<Option<T>, DatabaseError> {
        QueryBuilder::<T>::new(&self.table_name)?
            .filter(filter_data)?
            .select_optional(&self.pool)
            .await
    }

    pub async fn select_404(&self, filter_data: FilterData) -> Result<T, DatabaseError> {
        match self.select_one(filter_data).await? {
            Some(row) => Ok(row),
            None => Err(DatabaseError::NotFound("Record not found".to_string())),
        }
    }

    pub async fn count(&self, filter_data: FilterData) -> Result<i64, DatabaseError> {
        QueryBuilder::<T>::new(&self.table_name)?
            .filter(filter_data)?
            .count(&self.pool)
            .await
    }

    pub async fn count_grouped(
        &self,
        column: &str,
        filter_data: FilterData,
    ) -> Result<Vec<GroupCount>, DatabaseError> {
        QueryBuilder::<T>::new(&self.table_name)?
            .filter(filter_data)?
            .count_grouped(&self.pool, column)
            .await
    }

    pub async fn select_ids(&self, ids: &[Uuid]) -> Result<Vec<T>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let sql = format!("SELECT * FROM \"{}\" WHERE id = ANY($1)", self.table_name);
        let rows = sqlx::query_as::<_, T>(&sql)
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn delete_by_id(&self, id: Uuid) -> Result<u64, DatabaseError> {
        let sql = format!("DELETE FROM \"{}\" WHERE id = $1", self.table_name);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
