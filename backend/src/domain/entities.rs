/// Domain entities
use super::base::{DomainError, DomainResult};
use super::value_objects::BacklogItemId;

/// A BacklogItem is a named unit of work owned by a Product
///
/// It carries two identifiers: a surrogate `id` allocated by the storage
/// engine on first write, and a business `key` (`<productKey>-<n>`) assigned
/// by the owning product when the item is attached. Neither can be set by
/// callers outside the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BacklogItem {
    id: Option<i64>,
    key: Option<String>,
    name: String,
}

impl BacklogItem {
    /// Create a new, unattached backlog item
    pub fn new(name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DomainError::null_attribute("Backlog item name cannot be empty"));
        }
        Ok(BacklogItem {
            id: None,
            key: None,
            name,
        })
    }

    /// Rebuild an item from its stored attributes
    pub(crate) fn restore(id: Option<i64>, key: String, name: String) -> Self {
        BacklogItem {
            id,
            key: Some(key),
            name,
        }
    }

    /// Surrogate id, absent until the item has been persisted
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// Positional key, absent until the item is attached to a product
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The key as a typed identity
    pub fn backlog_item_id(&self) -> Option<BacklogItemId> {
        self.key.as_deref().and_then(|key| BacklogItemId::new(key).ok())
    }

    pub fn is_attached(&self) -> bool {
        self.key.is_some()
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub(crate) fn assign_key(&mut self, key: String) {
        self.key = Some(key);
    }

    pub(crate) fn assign_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_backlog_item() {
        let item = BacklogItem::new("First item").unwrap();

        assert_eq!(item.name(), "First item");
        assert!(item.key().is_none());
        assert!(item.id().is_none());
        assert!(!item.is_attached());
        assert!(!item.is_persisted());
        assert!(item.backlog_item_id().is_none());
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = BacklogItem::new("");
        assert!(matches!(result, Err(DomainError::NullAttribute(_))));
    }

    #[test]
    fn test_key_and_id_assignment() {
        let mut item = BacklogItem::new("Write docs").unwrap();
        item.assign_key("t:p-1".to_string());
        item.assign_id(7);

        assert_eq!(item.key(), Some("t:p-1"));
        assert_eq!(item.id(), Some(7));
        assert_eq!(
            item.backlog_item_id(),
            Some(BacklogItemId::new("t:p-1").unwrap())
        );
    }

    #[test]
    fn test_restore() {
        let item = BacklogItem::restore(Some(3), "t:p-2".to_string(), "Ship".to_string());
        assert!(item.is_attached());
        assert!(item.is_persisted());
        assert_eq!(item.name(), "Ship");
    }
}
