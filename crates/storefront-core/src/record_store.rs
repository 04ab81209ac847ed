//! Record store trait and the generic create helper
//!
//! The `RecordStore` trait is the persistence seam of Storefront. It deals
//! in untyped rows (JSON objects keyed by column name) so a single object
//! safe trait covers every entity; the typed layer on top is the `Record`
//! trait plus [`create_record`] and [`find_records`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{Error, Result, tenant::StoreId};

/// A persisted row: column name to value
pub type Row = serde_json::Map<String, Value>;

/// Conjunction of column equalities used by `RecordStore::find`.
///
/// An empty filter matches every row of the table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    /// Filter matching every row
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter on `store_id = ?`
    pub fn store(store_id: StoreId) -> Self {
        Self::all().eq("store_id", store_id.get())
    }

    /// Add an equality condition
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((column.into(), value.into()));
        self
    }

    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluate the filter against a row
    pub fn matches(&self, row: &Row) -> bool {
        self.conditions
            .iter()
            .all(|(column, value)| row.get(column) == Some(value))
    }
}

/// Persistence backend for Storefront records.
///
/// Implementations:
/// - `SqliteRecordStore`: SQLite via sqlx, with unique constraints per table
///
/// Implementations must report unique-constraint violations as
/// `Error::UniqueViolation` so the create path can tell them apart from
/// other failures.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a row and return the assigned primary key
    ///
    /// # Errors
    /// - `Error::UniqueViolation` if a unique constraint rejects the row
    /// - `Error::Database` for any other database failure
    async fn insert(&self, table: &str, row: Row) -> Result<i64>;

    /// Return every row of `table` matching `filter`, ordered by primary key
    async fn find(&self, table: &str, filter: &Filter) -> Result<Vec<Row>>;

    /// Mark `name` as the only default theme of `store_id`.
    ///
    /// Demoting the store's other themes and promoting the named one must
    /// happen atomically.
    ///
    /// # Errors
    /// - `Error::NotFound` if the store has no theme with that name
    async fn promote_default_theme(&self, store_id: StoreId, name: &str) -> Result<()>;

    /// Insert a theme row as its store's only default.
    ///
    /// Demoting the store's current default and inserting the row must
    /// commit together; on failure neither is visible.
    ///
    /// # Errors
    /// - `Error::UniqueViolation` if the theme name is taken in the store
    async fn insert_default_theme(&self, row: Row) -> Result<i64>;
}

/// A typed record persisted through a `RecordStore`.
///
/// Serialization field names are the column names. The `id` field is
/// assigned by the store and never written on insert.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    /// Table holding this record
    const TABLE: &'static str;

    /// Message of the `AlreadyExists` error raised on a duplicate insert
    const EXISTS_MESSAGE: &'static str;

    /// Store the primary key assigned on insert
    fn set_id(&mut self, id: i64);

    /// Stamp creation and update timestamps
    fn stamp(&mut self, now: DateTime<Utc>);

    /// Serialize into an insertable row (without the primary key)
    fn to_row(&self) -> Result<Row> {
        match serde_json::to_value(self)? {
            Value::Object(mut row) => {
                row.remove("id");
                Ok(row)
            }
            other => Err(Error::Internal(format!(
                "record for table {} did not serialize to an object: {}",
                Self::TABLE,
                other
            ))),
        }
    }

    /// Deserialize from a stored row
    fn from_row(row: Row) -> Result<Self> {
        Ok(serde_json::from_value(Value::Object(row))?)
    }
}

/// Create a record: stamp timestamps, insert, translate uniqueness failures.
///
/// Both timestamps receive the same UTC instant. On success the record's
/// `id` holds the assigned primary key. A unique-constraint violation
/// becomes `Error::AlreadyExists` (code 4001) with the record's message;
/// every other error is returned unchanged.
pub async fn create_record<R: Record>(store: &dyn RecordStore, record: &mut R) -> Result<()> {
    record.stamp(Utc::now());
    let row = record.to_row()?;
    let inserted = store.insert(R::TABLE, row).await;
    finish_create(record, inserted)
}

/// Apply the outcome of an insert issued for `record`: set the assigned id
/// or translate a uniqueness failure into `Error::AlreadyExists`.
pub fn finish_create<R: Record>(record: &mut R, inserted: Result<i64>) -> Result<()> {
    match inserted {
        Ok(id) => {
            record.set_id(id);
            tracing::debug!("Inserted {} row {}", R::TABLE, id);
            Ok(())
        }
        Err(Error::UniqueViolation(detail)) => {
            tracing::debug!("Duplicate {} rejected: {}", R::TABLE, detail);
            Err(Error::already_exists(R::EXISTS_MESSAGE))
        }
        Err(e) => Err(e),
    }
}

/// Load every record of type `R` matching `filter`
pub async fn find_records<R: Record>(store: &dyn RecordStore, filter: &Filter) -> Result<Vec<R>> {
    store
        .find(R::TABLE, filter)
        .await?
        .into_iter()
        .map(R::from_row)
        .collect()
}
