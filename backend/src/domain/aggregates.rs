/// Domain aggregates
use super::base::{AggregateRoot, DomainError, DomainResult, Entity};
use super::entities::BacklogItem;
use super::value_objects::{BacklogItemId, ProductId, ProductKey, ProductOwnerId, TenantId};
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// A Product is the aggregate root of a tenant's backlog
///
/// Its identity is the composite [`ProductKey`] `<tenant>:<product>`; the
/// tenant and product ids are always derived from that key rather than
/// stored separately. The product exclusively owns its backlog items, which
/// keep no reference back to it.
#[derive(Debug, Clone)]
pub struct Product {
    key: ProductKey,
    product_owner_id: ProductOwnerId,
    name: String,
    description: String,
    backlog_items: Vec<BacklogItem>,
}

/// Flat record of a product's full state
///
/// This is the shape persistence adapters read and write. It is installed
/// into an aggregate with [`Product::from_state`], which validates it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductState {
    pub product_key: String,
    pub product_owner_id: String,
    pub name: String,
    pub description: String,
    pub backlog_items: Vec<BacklogItemState>,
}

/// Flat record of one backlog item
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BacklogItemState {
    pub id: Option<i64>,
    pub key: Option<String>,
    pub name: String,
}

impl Product {
    /// Create a new product with an empty backlog
    pub fn new(
        tenant_id: TenantId,
        product_id: ProductId,
        product_owner_id: ProductOwnerId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DomainError::null_attribute("Product name cannot be empty"));
        }
        let key = ProductKey::encode(&tenant_id, &product_id)?;

        Ok(Product {
            key,
            product_owner_id,
            name,
            description: description.into(),
            backlog_items: Vec::new(),
        })
    }

    /// Install a stored state into a fresh aggregate
    ///
    /// Fails with `InvalidState` when the record is incomplete or when a
    /// backlog item's key does not match its position.
    pub fn from_state(state: ProductState) -> DomainResult<Self> {
        let key = ProductKey::parse(state.product_key)
            .map_err(|e| DomainError::invalid_state(format!("product key: {}", e)))?;
        let product_owner_id = ProductOwnerId::new(state.product_owner_id)
            .map_err(|e| DomainError::invalid_state(format!("{}: {}", key, e)))?;
        if state.name.is_empty() {
            return Err(DomainError::invalid_state(format!("{}: empty name", key)));
        }

        let mut backlog_items = Vec::with_capacity(state.backlog_items.len());
        for (index, item) in state.backlog_items.into_iter().enumerate() {
            let expected = key.backlog_item_key(index + 1);
            match item.key {
                Some(item_key) if item_key == expected && !item.name.is_empty() => {
                    backlog_items.push(BacklogItem::restore(item.id, item_key, item.name));
                }
                Some(item_key) if item_key != expected => {
                    return Err(DomainError::invalid_state(format!(
                        "backlog item at position {} has key {:?}, expected {:?}",
                        index + 1,
                        item_key,
                        expected
                    )));
                }
                Some(_) => {
                    return Err(DomainError::invalid_state(format!(
                        "backlog item {} has an empty name",
                        expected
                    )));
                }
                None => {
                    return Err(DomainError::invalid_state(format!(
                        "backlog item at position {} has no key",
                        index + 1
                    )));
                }
            }
        }

        Ok(Product {
            key,
            product_owner_id,
            name: state.name,
            description: state.description,
            backlog_items,
        })
    }

    /// Snapshot the full state, backlog included
    pub fn to_state(&self) -> ProductState {
        ProductState {
            product_key: self.key.as_str().to_string(),
            product_owner_id: self.product_owner_id.as_str().to_string(),
            name: self.name.clone(),
            description: self.description.clone(),
            backlog_items: self
                .backlog_items
                .iter()
                .map(|item| BacklogItemState {
                    id: item.id(),
                    key: item.key().map(str::to_string),
                    name: item.name().to_string(),
                })
                .collect(),
        }
    }

    pub fn key(&self) -> &ProductKey {
        &self.key
    }

    pub fn product_id(&self) -> ProductId {
        self.key.product_id()
    }

    pub fn tenant_id(&self) -> TenantId {
        self.key.tenant_id()
    }

    pub fn product_owner_id(&self) -> &ProductOwnerId {
        &self.product_owner_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Read-only snapshot of the backlog, in insertion order
    pub fn backlog_items(&self) -> BacklogSnapshot {
        BacklogSnapshot {
            items: self.backlog_items.iter().cloned().collect(),
        }
    }

    /// Find the backlog item whose key equals the given identity
    pub fn backlog_item(&self, backlog_item_id: &BacklogItemId) -> DomainResult<&BacklogItem> {
        self.backlog_items
            .iter()
            .find(|item| item.key() == Some(backlog_item_id.as_str()))
            .ok_or_else(|| {
                DomainError::not_found(format!("{} in product {}", backlog_item_id, self.key))
            })
    }

    /// Attach an item at the end of the backlog, assigning its positional key
    ///
    /// Items are not de-duplicated.
    pub(crate) fn add_backlog_item(&mut self, mut item: BacklogItem) -> &BacklogItem {
        let position = self.backlog_items.len() + 1;
        item.assign_key(self.key.backlog_item_key(position));
        self.backlog_items.push(item);
        &self.backlog_items[position - 1]
    }

    /// Record the surrogate id the storage engine allocated for the item at `index`
    pub(crate) fn record_backlog_item_id(&mut self, index: usize, id: i64) {
        if let Some(item) = self.backlog_items.get_mut(index) {
            item.assign_id(id);
        }
    }
}

impl PartialEq for Product {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Product {}

impl Hash for Product {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl Entity for Product {
    type Id = ProductKey;

    fn id(&self) -> &Self::Id {
        &self.key
    }
}

impl AggregateRoot for Product {
    fn has_same_state(&self, other: &Self) -> bool {
        self.key == other.key
            && self.product_owner_id == other.product_owner_id
            && self.name == other.name
            && self.description == other.description
    }
}

/// Immutable, shareable view of a product's backlog
///
/// Derefs to a slice. The snapshot is detached from the aggregate, so it can
/// be sent across threads while the product keeps changing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BacklogSnapshot {
    items: Arc<[BacklogItem]>,
}

impl BacklogSnapshot {
    /// Snapshots are read-only: this always fails with `ImmutableView`
    pub fn try_push(&self, item: BacklogItem) -> DomainResult<()> {
        Err(DomainError::ImmutableView(format!(
            "cannot add {:?} to a backlog snapshot",
            item.name()
        )))
    }

    pub fn keys(&self) -> Vec<&str> {
        self.items.iter().filter_map(BacklogItem::key).collect()
    }
}

impl Deref for BacklogSnapshot {
    type Target = [BacklogItem];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<'a> IntoIterator for &'a BacklogSnapshot {
    type Item = &'a BacklogItem;
    type IntoIter = std::slice::Iter<'a, BacklogItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
