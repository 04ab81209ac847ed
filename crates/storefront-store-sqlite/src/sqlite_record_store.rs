//! SqliteRecordStore - RecordStore trait implementation for SQLite

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use sqlx::query::Query;
use sqlx::sqlite::{
    Sqlite, SqliteArguments, SqliteConnectOptions, SqliteJournalMode, SqlitePool,
    SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use std::path::PathBuf;
use tracing::{debug, info};

use storefront_core::{
    Error, Result,
    record_store::{Filter, RecordStore, Row},
    tenant::StoreId,
};

use crate::schema::{TABLES, initialize_schema, is_identifier};

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// SQLite-backed record store
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Open (or create) the database at `db_path` and bootstrap the schema
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file (`~` is expanded)
    /// * `max_connections` - Connection pool size
    ///
    /// # Errors
    /// - `Error::Io` if the parent directory can't be created
    /// - `Error::Database` if the connection or schema setup fails
    pub async fn new(db_path: impl Into<PathBuf>, max_connections: u32) -> Result<Self> {
        let db_path = expand_tilde(db_path.into())?;

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(
                SqliteConnectOptions::new()
                    .filename(&db_path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .synchronous(SqliteSynchronous::Normal),
            )
            .await
            .map_err(|e| Error::Database(format!("Failed to open {}: {}", db_path.display(), e)))?;

        initialize_schema(&pool).await?;

        info!("Opened record store at {:?}", db_path);

        Ok(Self { pool })
    }

    fn check_table(table: &str) -> Result<()> {
        if TABLES.contains(&table) {
            Ok(())
        } else {
            Err(Error::Database(format!("Unknown table: {}", table)))
        }
    }

    fn check_column(column: &str) -> Result<()> {
        if is_identifier(column) {
            Ok(())
        } else {
            Err(Error::Database(format!("Invalid column name: {:?}", column)))
        }
    }

    /// `INSERT` statement for `row`, one placeholder per column in row order
    fn insert_sql(table: &str, row: &Row) -> Result<String> {
        Self::check_table(table)?;
        if row.is_empty() {
            return Err(Error::Database(format!("Empty insert into {}", table)));
        }

        let mut columns = Vec::with_capacity(row.len());
        for column in row.keys() {
            Self::check_column(column)?;
            columns.push(format!("\"{}\"", column));
        }
        let placeholders = vec!["?"; row.len()].join(", ");
        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders
        ))
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn insert(&self, table: &str, row: Row) -> Result<i64> {
        let sql = Self::insert_sql(table, &row)?;

        let mut query = sqlx::query(&sql);
        for value in row.values() {
            query = bind_value(query, value);
        }

        let result = query.execute(&self.pool).await.map_err(map_sqlx_error)?;
        let id = result.last_insert_rowid();
        debug!("Inserted row {} into {}", id, table);
        Ok(id)
    }

    async fn find(&self, table: &str, filter: &Filter) -> Result<Vec<Row>> {
        Self::check_table(table)?;

        let mut sql = format!("SELECT * FROM {}", table);
        if !filter.is_empty() {
            let mut clauses = Vec::with_capacity(filter.conditions().len());
            for (column, _) in filter.conditions() {
                Self::check_column(column)?;
                clauses.push(format!("\"{}\" = ?", column));
            }
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY id");

        let mut query = sqlx::query(&sql);
        for (_, value) in filter.conditions() {
            query = bind_value(query, value);
        }

        let rows = query.fetch_all(&self.pool).await.map_err(map_sqlx_error)?;
        rows.iter().map(decode_row).collect()
    }

    async fn promote_default_theme(&self, store_id: StoreId, name: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::AutoSi, true);
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let exists: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM themes WHERE store_id = ? AND name = ?")
                .bind(store_id.get())
                .bind(name)
                .fetch_one(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;

        if exists == 0 {
            // Dropping the transaction rolls it back
            return Err(Error::NotFound(format!(
                "theme {:?} in store {}",
                name, store_id
            )));
        }

        // Demote first: the partial unique index allows one default per store
        sqlx::query(
            "UPDATE themes SET is_default = 0, updated_at = ? WHERE store_id = ? AND is_default = 1 AND name <> ?",
        )
        .bind(&now)
        .bind(store_id.get())
        .bind(name)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        sqlx::query(
            "UPDATE themes SET is_default = 1, updated_at = ? WHERE store_id = ? AND name = ?",
        )
        .bind(&now)
        .bind(store_id.get())
        .bind(name)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        info!("Theme {:?} is now the default of store {}", name, store_id);
        Ok(())
    }

    async fn insert_default_theme(&self, mut row: Row) -> Result<i64> {
        let store_id = row
            .get("store_id")
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::Database("Theme row without store_id".to_string()))?;
        row.insert("is_default".to_string(), Value::Bool(true));
        let sql = Self::insert_sql("themes", &row)?;
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::AutoSi, true);

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query(
            "UPDATE themes SET is_default = 0, updated_at = ? WHERE store_id = ? AND is_default = 1",
        )
        .bind(&now)
        .bind(store_id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let mut query = sqlx::query(&sql);
        for value in row.values() {
            query = bind_value(query, value);
        }
        // A failed insert drops the transaction, restoring the previous default
        let result = query.execute(&mut *tx).await.map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        let id = result.last_insert_rowid();
        info!("Inserted theme {} as the default of store {}", id, store_id);
        Ok(id)
    }
}

/// Bind a JSON value with the closest SQLite type
fn bind_value<'q>(query: SqliteQuery<'q>, value: &'q Value) -> SqliteQuery<'q> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64()),
        },
        Value::String(s) => query.bind(s.as_str()),
        other => query.bind(other.to_string()),
    }
}

/// Convert a result row into a JSON object keyed by column name
fn decode_row(row: &SqliteRow) -> Result<Row> {
    let mut out = Row::new();

    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index).map_err(map_sqlx_error)?;

        let value = if raw.is_null() {
            Value::Null
        } else if column.type_info().name() == "BOOLEAN" {
            Value::Bool(row.try_get::<bool, _>(index).map_err(map_sqlx_error)?)
        } else {
            let storage = raw.type_info().name().to_string();
            match storage.as_str() {
                "INTEGER" => Value::from(row.try_get::<i64, _>(index).map_err(map_sqlx_error)?),
                "REAL" => Value::from(row.try_get::<f64, _>(index).map_err(map_sqlx_error)?),
                "BLOB" => {
                    let bytes: Vec<u8> = row.try_get(index).map_err(map_sqlx_error)?;
                    Value::String(String::from_utf8_lossy(&bytes).into_owned())
                }
                _ => Value::String(row.try_get::<String, _>(index).map_err(map_sqlx_error)?),
            }
        };

        out.insert(column.name().to_string(), value);
    }

    Ok(out)
}

/// Map sqlx errors, keeping unique violations distinguishable
fn map_sqlx_error(e: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db) = &e
        && db.is_unique_violation()
    {
        return Error::UniqueViolation(db.message().to_string());
    }
    Error::Database(e.to_string())
}

/// Expand tilde (~) in path
fn expand_tilde(path: PathBuf) -> Result<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| Error::Internal("Could not determine home directory".to_string()))?;
            Ok(home.join(rest))
        }
        Err(_) => Ok(path),
    }
}
