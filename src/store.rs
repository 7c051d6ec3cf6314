//! City persistence: CRUD and predicate scans against SQLite.

use sqlx::{Executor, Sqlite, SqlitePool};

use crate::city::{City, CityDraft};
use crate::query::{CityFilter, SortSpec};

const COLUMNS: &str = "id, name, county, state_code, postal_code, latitude, longitude";

pub struct CityStore;

impl CityStore {
    /// Insert one city; the store assigns the id. Returns the created row.
    pub async fn create(pool: &SqlitePool, draft: &CityDraft) -> Result<City, sqlx::Error> {
        let sql = format!(
            "INSERT INTO cities (name, county, state_code, postal_code, latitude, longitude) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        );
        sqlx::query_as(&sql)
            .bind(&draft.name)
            .bind(&draft.county)
            .bind(&draft.state_code)
            .bind(&draft.postal_code)
            .bind(&draft.latitude)
            .bind(&draft.longitude)
            .fetch_one(pool)
            .await
    }

    /// Fetch one city by id.
    pub async fn get(pool: &SqlitePool, id: i64) -> Result<Option<City>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM cities WHERE id = ?");
        sqlx::query_as(&sql).bind(id).fetch_optional(pool).await
    }

    /// Full replace of one row by id. Returns the updated row, or None if the
    /// id does not exist.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        draft: &CityDraft,
    ) -> Result<Option<City>, sqlx::Error> {
        let sql = format!(
            "UPDATE cities SET name = ?, county = ?, state_code = ?, postal_code = ?, \
             latitude = ?, longitude = ? WHERE id = ? RETURNING {COLUMNS}"
        );
        sqlx::query_as(&sql)
            .bind(&draft.name)
            .bind(&draft.county)
            .bind(&draft.state_code)
            .bind(&draft.postal_code)
            .bind(&draft.latitude)
            .bind(&draft.longitude)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete one row by id. Returns false if the id does not exist.
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM cities WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Scan matching rows in the given order, bounded by limit/offset. Takes
    /// any executor so a page and its count can share one transaction.
    pub async fn scan<'e, E>(
        executor: E,
        filter: Option<&CityFilter>,
        sort: SortSpec,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<City>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let mut sql = format!("SELECT {COLUMNS} FROM cities");
        if let Some(f) = filter {
            sql.push_str(" WHERE ");
            sql.push_str(f.where_clause());
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(&sort.order_clause());
        sql.push_str(" LIMIT ? OFFSET ?");
        tracing::debug!(sql = %sql, "scan");

        let mut query = sqlx::query_as(&sql);
        if let Some(f) = filter {
            query = query.bind(f.value());
        }
        query.bind(limit).bind(offset).fetch_all(executor).await
    }

    /// Count rows matching the filter.
    pub async fn count<'e, E>(executor: E, filter: Option<&CityFilter>) -> Result<i64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let mut sql = String::from("SELECT COUNT(*) FROM cities");
        if let Some(f) = filter {
            sql.push_str(" WHERE ");
            sql.push_str(f.where_clause());
        }
        tracing::debug!(sql = %sql, "count");

        let mut query = sqlx::query_scalar(&sql);
        if let Some(f) = filter {
            query = query.bind(f.value());
        }
        query.fetch_one(executor).await
    }
}
