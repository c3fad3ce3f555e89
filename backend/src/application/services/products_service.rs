/// Application service mediating between callers and the product repository
use crate::application::repositories::ProductRepository;
use crate::domain::aggregates::Product;
use crate::domain::base::{DomainError, DomainResult};
use crate::domain::entities::BacklogItem;
use crate::domain::value_objects::{ProductId, ProductKey, ProductOwnerId, TenantId};
use tracing::{debug, info, warn};

/// Name of the item every new product's backlog starts with
pub const FIRST_BACKLOG_ITEM: &str = "First item";

/// Service for creating and retrieving products within a tenant
///
/// The service holds no state of its own beyond the repository handle, so it
/// can be shared between threads whenever the repository can.
pub struct ProductsService<R: ProductRepository> {
    repository: R,
}

impl<R: ProductRepository> ProductsService<R> {
    pub fn new(repository: R) -> Self {
        ProductsService { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Create a product with a freshly minted id and a seeded first backlog item
    ///
    /// Returns the in-memory aggregate that was saved, not a re-read.
    pub fn create(
        &self,
        tenant_id: &TenantId,
        product_owner_id: &ProductOwnerId,
        name: &str,
        description: &str,
    ) -> DomainResult<Product> {
        let product_id = ProductId::generate();
        let mut product = Product::new(
            tenant_id.clone(),
            product_id,
            product_owner_id.clone(),
            name,
            description,
        )?;
        product.add_backlog_item(BacklogItem::new(FIRST_BACKLOG_ITEM)?);

        self.save(&mut product)?;
        info!(product_key = %product.key(), owner = %product_owner_id, "Created product");
        Ok(product)
    }

    /// Look up a product of the given tenant
    pub fn get(&self, tenant_id: &TenantId, product_id: &ProductId) -> DomainResult<Option<Product>> {
        let key = ProductKey::encode(tenant_id, product_id)?;
        self.find(&key)
    }

    /// Append a backlog item to an existing product and save it
    ///
    /// Returns the attached item, carrying its positional key and the
    /// surrogate id the repository allocated.
    pub fn add_backlog_item(
        &self,
        tenant_id: &TenantId,
        product_id: &ProductId,
        name: &str,
    ) -> DomainResult<BacklogItem> {
        let item = BacklogItem::new(name)?;
        let key = ProductKey::encode(tenant_id, product_id)?;
        let mut product = self
            .find(&key)?
            .ok_or_else(|| DomainError::not_found(format!("product {}", key)))?;

        product.add_backlog_item(item);
        self.save(&mut product)?;

        let attached = product
            .backlog_items()
            .last()
            .cloned()
            .ok_or_else(|| DomainError::invalid_state("attached backlog item went missing"))?;
        info!(product_key = %product.key(), backlog_item = ?attached.key(), "Added backlog item");
        Ok(attached)
    }

    fn find(&self, key: &ProductKey) -> DomainResult<Option<Product>> {
        let product = self.repository.find_by_key(key)?;
        debug!(product_key = %key, found = product.is_some(), "Looked up product");
        Ok(product)
    }

    fn save(&self, product: &mut Product) -> DomainResult<()> {
        self.repository.save(product).map_err(|e| {
            warn!(product_key = %product.key(), error = %e, "Failed to save product");
            e
        })
    }
}
