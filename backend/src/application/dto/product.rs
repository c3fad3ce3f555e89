use crate::domain::{aggregates::Product, entities::BacklogItem};
use crate::domain::value_objects::{ProductId, ProductOwnerId, TenantId};
use serde::{Deserialize, Serialize};

/// Read model of a product, suitable for printing or sending over a wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductView {
    /// The composite `<tenant>:<product>` key
    pub product_key: String,
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub product_owner_id: ProductOwnerId,
    pub name: String,
    pub description: String,
    /// Backlog items in insertion order
    pub backlog_items: Vec<BacklogItemView>,
}

/// Read model of a single backlog item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacklogItemView {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<i64>,
    pub key: Option<String>,
    pub name: String,
}

impl From<&BacklogItem> for BacklogItemView {
    fn from(item: &BacklogItem) -> Self {
        Self {
            id: item.id(),
            key: item.key().map(str::to_string),
            name: item.name().to_string(),
        }
    }
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            product_key: product.key().as_str().to_string(),
            tenant_id: product.tenant_id(),
            product_id: product.product_id(),
            product_owner_id: product.product_owner_id().clone(),
            name: product.name().to_string(),
            description: product.description().to_string(),
            backlog_items: product
                .backlog_items()
                .iter()
                .map(BacklogItemView::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_view_serializes_identities_as_strings() {
        let mut product = Product::new(
            TenantId::new("t").unwrap(),
            ProductId::new("p").unwrap(),
            ProductOwnerId::new("o").unwrap(),
            "Widget",
            "A widget",
        )
        .unwrap();
        product.add_backlog_item(BacklogItem::new("First item").unwrap());

        let view = ProductView::from(&product);
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["product_key"], "t:p");
        assert_eq!(json["tenant_id"], "t");
        assert_eq!(json["product_id"], "p");
        assert_eq!(json["product_owner_id"], "o");
        assert_eq!(json["backlog_items"][0]["key"], "t:p-1");
        assert_eq!(json["backlog_items"][0]["name"], "First item");
        assert!(json["backlog_items"][0].get("id").is_none());
    }

    #[test]
    fn test_product_view_deserializes() {
        let json = r#"{
            "product_key": "t:p",
            "tenant_id": "t",
            "product_id": "p",
            "product_owner_id": "o",
            "name": "Widget",
            "description": "",
            "backlog_items": [{"id": 4, "key": "t:p-1", "name": "First item"}]
        }"#;

        let view: ProductView = serde_json::from_str(json).unwrap();
        assert_eq!(view.tenant_id.as_str(), "t");
        assert_eq!(view.backlog_items[0].id, Some(4));
    }
}
