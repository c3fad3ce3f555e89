use crate::application::repositories::ProductRepository;
use crate::domain::aggregates::{Product, ProductState};
use crate::domain::base::DomainError;
use crate::domain::value_objects::ProductKey;
use crate::domain::DomainResult;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;
use tracing::debug;

/// In-memory implementation of the ProductRepository trait
///
/// Stores flat product states, so a lookup always hands out a fresh
/// aggregate. Follows the same rules as the SQLite adapter: surrogate ids
/// come from a counter, a backlog key already held by another stored item is
/// a `ConstraintViolation`, and items missing from a saved aggregate are
/// dropped.
#[derive(Debug)]
pub struct InMemoryProductRepository {
    products: RwLock<HashMap<ProductKey, ProductState>>,
    next_id: AtomicI64,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self {
            products: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of stored products
    pub fn len(&self) -> DomainResult<usize> {
        let products = self.products.read().map_err(|_| Self::poisoned())?;
        Ok(products.len())
    }

    pub fn is_empty(&self) -> DomainResult<bool> {
        Ok(self.len()? == 0)
    }

    fn poisoned() -> DomainError {
        DomainError::StorageUnavailable("product store lock poisoned".to_string())
    }
}

impl Default for InMemoryProductRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductRepository for InMemoryProductRepository {
    fn save(&self, product: &mut Product) -> DomainResult<()> {
        let mut products = self.products.write().map_err(|_| Self::poisoned())?;
        let incoming = product.to_state();

        let stored_ids: HashMap<&str, Option<i64>> = products
            .get(product.key())
            .map(|stored| {
                stored
                    .backlog_items
                    .iter()
                    .filter_map(|item| item.key.as_deref().map(|key| (key, item.id)))
                    .collect()
            })
            .unwrap_or_default();
        let known_ids: HashSet<i64> = stored_ids.values().flatten().copied().collect();

        let mut allocated = Vec::new();
        for (index, item) in incoming.backlog_items.iter().enumerate() {
            let id = item.id.filter(|id| known_ids.contains(id));
            if let Some(key) = item.key.as_deref() {
                if stored_ids.get(key).is_some_and(|stored_id| *stored_id != id) {
                    return Err(DomainError::ConstraintViolation(format!(
                        "backlog item key {} is already taken",
                        key
                    )));
                }
            }
            if id.is_none() {
                allocated.push((index, self.next_id.fetch_add(1, Ordering::SeqCst)));
            }
        }

        for (index, id) in allocated {
            product.record_backlog_item_id(index, id);
        }
        let state = product.to_state();
        debug!(
            product_key = %product.key(),
            backlog_items = state.backlog_items.len(),
            "Saved product in memory"
        );
        products.insert(product.key().clone(), state);
        Ok(())
    }

    fn find_by_key(&self, key: &ProductKey) -> DomainResult<Option<Product>> {
        let state = {
            let products = self.products.read().map_err(|_| Self::poisoned())?;
            products.get(key).cloned()
        };

        state.map(Product::from_state).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::base::AggregateRoot;
    use crate::domain::entities::BacklogItem;
    use crate::domain::value_objects::{ProductId, ProductOwnerId, TenantId};

    fn create_test_product() -> Product {
        let mut product = Product::new(
            TenantId::new("t").unwrap(),
            ProductId::new("p").unwrap(),
            ProductOwnerId::new("o").unwrap(),
            "Widget",
            "",
        )
        .unwrap();
        product.add_backlog_item(BacklogItem::new("First item").unwrap());
        product
    }

    #[test]
    fn test_save_and_find_by_key() {
        let repo = InMemoryProductRepository::new();
        let mut product = create_test_product();

        repo.save(&mut product).unwrap();
        let loaded = repo.find_by_key(product.key()).unwrap().unwrap();

        assert_eq!(loaded, product);
        assert!(loaded.has_same_state(&product));
        assert_eq!(loaded.backlog_items()[0].id(), Some(1));
        assert_eq!(repo.len().unwrap(), 1);
    }

    #[test]
    fn test_find_missing() {
        let repo = InMemoryProductRepository::default();
        let key = ProductKey::parse("t:missing").unwrap();

        assert!(repo.find_by_key(&key).unwrap().is_none());
        assert!(repo.is_empty().unwrap());
    }

    #[test]
    fn test_second_save_updates_in_place() {
        let repo = InMemoryProductRepository::new();
        let mut product = create_test_product();
        repo.save(&mut product).unwrap();
        product.add_backlog_item(BacklogItem::new("Second").unwrap());
        repo.save(&mut product).unwrap();

        let loaded = repo.find_by_key(product.key()).unwrap().unwrap();
        assert_eq!(repo.len().unwrap(), 1);
        assert_eq!(loaded.backlog_items().keys(), vec!["t:p-1", "t:p-2"]);
        assert_eq!(loaded.backlog_items()[0].id(), Some(1));
        assert_eq!(loaded.backlog_items()[1].id(), Some(2));
    }

    #[test]
    fn test_stale_snapshot_is_a_constraint_violation() {
        let repo = InMemoryProductRepository::new();
        let mut product = create_test_product();
        repo.save(&mut product).unwrap();

        let mut first = repo.find_by_key(product.key()).unwrap().unwrap();
        let mut second = repo.find_by_key(product.key()).unwrap().unwrap();
        first.add_backlog_item(BacklogItem::new("Mine").unwrap());
        repo.save(&mut first).unwrap();
        second.add_backlog_item(BacklogItem::new("Theirs").unwrap());

        let result = repo.save(&mut second);

        assert!(matches!(result, Err(DomainError::ConstraintViolation(_))));
        let stored = repo.find_by_key(product.key()).unwrap().unwrap();
        assert_eq!(stored.backlog_items()[1].name(), "Mine");
    }

    #[test]
    fn test_found_products_are_fresh_instances() {
        let repo = InMemoryProductRepository::new();
        let mut product = create_test_product();
        repo.save(&mut product).unwrap();

        let mut loaded = repo.find_by_key(product.key()).unwrap().unwrap();
        loaded.add_backlog_item(BacklogItem::new("Unsaved").unwrap());

        let again = repo.find_by_key(product.key()).unwrap().unwrap();
        assert_eq!(again.backlog_items().len(), 1);
    }

    #[test]
    fn test_poisoned_store_is_storage_unavailable() {
        let repo = InMemoryProductRepository::new();
        let _ = std::thread::scope(|s| {
            s.spawn(|| {
                let _guard = repo.products.write().unwrap();
                panic!("writer died holding the store");
            })
            .join()
        });
        let mut product = create_test_product();

        assert!(matches!(
            repo.save(&mut product),
            Err(DomainError::StorageUnavailable(_))
        ));
        assert!(matches!(
            repo.find_by_key(product.key()),
            Err(DomainError::StorageUnavailable(_))
        ));
        assert!(matches!(repo.len(), Err(DomainError::StorageUnavailable(_))));
        assert!(matches!(repo.is_empty(), Err(DomainError::StorageUnavailable(_))));
    }
}
