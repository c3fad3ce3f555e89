use crate::application::repositories::ProductRepository;
use crate::domain::aggregates::{BacklogItemState, Product, ProductState};
use crate::domain::base::DomainError;
use crate::domain::value_objects::ProductKey;
use crate::domain::DomainResult;
use rusqlite::{params, Connection, ErrorCode, Result as SqliteResult, Transaction};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// SQLite-based implementation of the ProductRepository trait
///
/// The connection sits behind a mutex, so a single repository can serve
/// several threads; every save runs in its own transaction.
pub struct SqliteProductRepository {
    conn: Mutex<Connection>,
}

impl SqliteProductRepository {
    /// Create a new SQLite repository with the given connection
    pub fn new(conn: Connection) -> Self {
        SqliteProductRepository {
            conn: Mutex::new(conn),
        }
    }

    /// Create a new in-memory SQLite repository (useful for testing)
    pub fn new_in_memory() -> SqliteResult<Self> {
        let conn = Connection::open_in_memory()?;
        super::schema::initialize_database(&conn)?;
        Ok(Self::new(conn))
    }

    /// Create a new file-based SQLite repository
    pub fn new_with_path(path: impl AsRef<std::path::Path>) -> SqliteResult<Self> {
        let conn = Connection::open(path)?;
        super::schema::initialize_database(&conn)?;
        Ok(Self::new(conn))
    }

    fn connection(&self) -> DomainResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| DomainError::StorageUnavailable("connection lock poisoned".to_string()))
    }

    /// Save a product and all its backlog items in a single transaction
    ///
    /// Returns the surrogate ids allocated for items that had none, as
    /// `(backlog index, id)` pairs.
    fn save_product_transaction(
        conn: &mut Connection,
        state: &ProductState,
    ) -> SqliteResult<Vec<(usize, i64)>> {
        let tx = conn.transaction()?;

        // Insert or update the product row, keeping created_at on update
        tx.execute(
            "INSERT INTO product (product_key, product_owner_id, name, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, datetime('now'), datetime('now'))
             ON CONFLICT(product_key) DO UPDATE SET
                product_owner_id = excluded.product_owner_id,
                name = excluded.name,
                description = excluded.description,
                updated_at = excluded.updated_at",
            params![
                state.product_key,
                state.product_owner_id,
                state.name,
                state.description
            ],
        )?;

        let mut kept: HashSet<i64> = HashSet::new();
        let mut allocated = Vec::new();

        for (index, item) in state.backlog_items.iter().enumerate() {
            let position = (index + 1) as i64;
            let updated = match item.id {
                Some(id) => Self::update_backlog_item(&tx, &state.product_key, id, item, position)?,
                None => false,
            };

            if let Some(id) = item.id.filter(|_| updated) {
                kept.insert(id);
            } else {
                let id = Self::insert_backlog_item(&tx, &state.product_key, item, position)?;
                kept.insert(id);
                allocated.push((index, id));
            }
        }

        // Orphan removal: rows the aggregate no longer holds
        let stored_ids: Vec<i64> = tx
            .prepare("SELECT id FROM backlog WHERE product_key = ?1")?
            .query_map(params![state.product_key], |row| row.get(0))?
            .collect::<SqliteResult<Vec<_>>>()?;
        for id in stored_ids.into_iter().filter(|id| !kept.contains(id)) {
            tx.execute("DELETE FROM backlog WHERE id = ?1", params![id])?;
        }

        tx.commit()?;
        Ok(allocated)
    }

    fn update_backlog_item(
        tx: &Transaction<'_>,
        product_key: &str,
        id: i64,
        item: &BacklogItemState,
        position: i64,
    ) -> SqliteResult<bool> {
        let rows = tx.execute(
            "UPDATE backlog SET item_key = ?3, name = ?4, position = ?5
             WHERE id = ?1 AND product_key = ?2",
            params![id, product_key, item.key, item.name, position],
        )?;
        Ok(rows > 0)
    }

    fn insert_backlog_item(
        tx: &Transaction<'_>,
        product_key: &str,
        item: &BacklogItemState,
        position: i64,
    ) -> SqliteResult<i64> {
        tx.execute(
            "INSERT INTO backlog (product_key, item_key, name, position)
             VALUES (?1, ?2, ?3, ?4)",
            params![product_key, item.key, item.name, position],
        )?;
        Ok(tx.last_insert_rowid())
    }

    /// Load the stored state of a product and its backlog
    fn load_state(conn: &Connection, key: &ProductKey) -> SqliteResult<Option<ProductState>> {
        let product_result: Result<(String, String, String), _> = conn.query_row(
            "SELECT product_owner_id, name, description FROM product WHERE product_key = ?1",
            params![key.as_str()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        );

        let (product_owner_id, name, description) = match product_result {
            Ok(data) => data,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e),
        };

        let mut stmt = conn.prepare(
            "SELECT id, item_key, name
             FROM backlog
             WHERE product_key = ?1
             ORDER BY position",
        )?;

        let backlog_items = stmt
            .query_map(params![key.as_str()], |row| {
                Ok(BacklogItemState {
                    id: Some(row.get(0)?),
                    key: Some(row.get(1)?),
                    name: row.get(2)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(Some(ProductState {
            product_key: key.as_str().to_string(),
            product_owner_id,
            name,
            description,
            backlog_items,
        }))
    }
}

/// Map an engine error onto the repository error kinds
fn storage_error(error: rusqlite::Error) -> DomainError {
    match &error {
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation => {
            DomainError::ConstraintViolation(error.to_string())
        }
        _ => DomainError::StorageUnavailable(format!("Database error: {}", error)),
    }
}

impl ProductRepository for SqliteProductRepository {
    fn save(&self, product: &mut Product) -> DomainResult<()> {
        let state = product.to_state();
        let allocated = {
            let mut conn = self.connection()?;
            Self::save_product_transaction(&mut conn, &state).map_err(|e| {
                let error = storage_error(e);
                warn!(product_key = %product.key(), error = %error, "Product save rolled back");
                error
            })?
        };

        for (index, id) in allocated {
            product.record_backlog_item_id(index, id);
        }
        debug!(
            product_key = %product.key(),
            backlog_items = state.backlog_items.len(),
            "Saved product"
        );
        Ok(())
    }

    fn find_by_key(&self, key: &ProductKey) -> DomainResult<Option<Product>> {
        let state = {
            let conn = self.connection()?;
            Self::load_state(&conn, key).map_err(storage_error)?
        };

        state.map(Product::from_state).transpose()
    }
}
