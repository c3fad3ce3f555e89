use crate::domain::{aggregates::Product, value_objects::ProductKey, DomainResult};
use std::sync::Arc;

/// Repository trait for managing Product aggregates.
///
/// This trait defines the contract for persisting and retrieving Product
/// aggregates, keyed by their composite `<tenant>:<product>` key.
/// Implementations can be backed by different storage mechanisms (in-memory,
/// database, etc.) and synchronize internally, so a repository can be shared
/// between threads behind an `Arc`.
pub trait ProductRepository {
    /// Saves a product together with its backlog items.
    ///
    /// If a product with the same key already exists it is updated in place.
    /// Surrogate ids allocated for new backlog items are written back into
    /// `product`. Fails with `StorageUnavailable` or `ConstraintViolation`.
    fn save(&self, product: &mut Product) -> DomainResult<()>;

    /// Finds a product by its composite key.
    ///
    /// Returns `Ok(Some(product))` if found, `Ok(None)` if not found,
    /// or an error if the operation fails.
    fn find_by_key(&self, key: &ProductKey) -> DomainResult<Option<Product>>;
}

impl<R: ProductRepository + ?Sized> ProductRepository for Arc<R> {
    fn save(&self, product: &mut Product) -> DomainResult<()> {
        (**self).save(product)
    }

    fn find_by_key(&self, key: &ProductKey) -> DomainResult<Option<Product>> {
        (**self).find_by_key(key)
    }
}

impl<R: ProductRepository + ?Sized> ProductRepository for &R {
    fn save(&self, product: &mut Product) -> DomainResult<()> {
        (**self).save(product)
    }

    fn find_by_key(&self, key: &ProductKey) -> DomainResult<Option<Product>> {
        (**self).find_by_key(key)
    }
}
