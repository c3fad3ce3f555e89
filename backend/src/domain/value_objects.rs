/// Value objects for the domain layer
use super::base::{DomainError, DomainResult, ValueObject};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Declares an opaque string identity.
///
/// Each identity is its own type, so equality and hashing cover both the
/// variant and the value. The textual form is `<VariantName>(<value>)`.
macro_rules! string_identity {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Mint a fresh identity from a random UUID.
            pub fn generate() -> Self {
                $name(Uuid::new_v4().to_string())
            }

            pub fn new(value: impl Into<String>) -> DomainResult<Self> {
                let value = value.into();
                if value.is_empty() {
                    return Err(DomainError::null_attribute(concat!(
                        stringify!($name),
                        " cannot be empty"
                    )));
                }
                Ok($name(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::generate()
            }
        }

        impl ValueObject for $name {}

        impl TryFrom<String> for $name {
            type Error = DomainError;

            fn try_from(value: String) -> DomainResult<Self> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

string_identity!(
    /// Identifier of a tenant, the partition every product lives in
    TenantId
);
string_identity!(
    /// Identifier of a product, unique within its tenant
    ProductId
);
string_identity!(
    /// Identifier of the person owning a product
    ProductOwnerId
);
string_identity!(
    /// Business identifier of a backlog item; its value is the item's key
    BacklogItemId
);

/// Separator between the tenant and product segments of a [`ProductKey`]
pub const KEY_SEPARATOR: char = ':';

/// Composite primary key of a product: `<tenant>:<product>`
///
/// A `ProductKey` always has two non-empty segments. Only the first `:` is
/// significant, so tenant values must not contain one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductKey {
    value: String,
    separator: usize,
}

impl ProductKey {
    /// Build the key of a product, rejecting tenants that contain `:`
    pub fn encode(tenant_id: &TenantId, product_id: &ProductId) -> DomainResult<Self> {
        if tenant_id.as_str().contains(KEY_SEPARATOR) {
            return Err(DomainError::malformed_key(format!(
                "{} must not contain '{}'",
                tenant_id, KEY_SEPARATOR
            )));
        }
        Ok(ProductKey {
            value: encode(tenant_id, product_id),
            separator: tenant_id.as_str().len(),
        })
    }

    /// Parse a stored key, checking the `<nonempty>:<nonempty>` grammar
    pub fn parse(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        let (tenant, _) = split(&value).ok_or_else(|| malformed(&value))?;
        Ok(ProductKey {
            separator: tenant.len(),
            value,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn decode(&self) -> (TenantId, ProductId) {
        let (tenant, rest) = self.value.split_at(self.separator);
        let product = &rest[KEY_SEPARATOR.len_utf8()..];
        (TenantId(tenant.to_string()), ProductId(product.to_string()))
    }

    pub fn tenant_id(&self) -> TenantId {
        self.decode().0
    }

    pub fn product_id(&self) -> ProductId {
        self.decode().1
    }

    /// Key of the backlog item attached at `position` (1-based)
    pub fn backlog_item_key(&self, position: usize) -> String {
        format!("{}-{}", self.value, position)
    }
}

impl ValueObject for ProductKey {}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Encode a (tenant, product) pair into its composite key string
pub fn encode(tenant_id: &TenantId, product_id: &ProductId) -> String {
    format!("{}{}{}", tenant_id.0, KEY_SEPARATOR, product_id.0)
}

/// Decode a composite key string back into its (tenant, product) pair
///
/// Splits on the first `:`. Fails with `MalformedKey` when the separator is
/// missing or either segment is empty.
pub fn decode(product_key: &str) -> DomainResult<(TenantId, ProductId)> {
    let (tenant, product) = split(product_key).ok_or_else(|| malformed(product_key))?;
    Ok((TenantId(tenant.to_string()), ProductId(product.to_string())))
}

fn malformed(product_key: &str) -> DomainError {
    DomainError::malformed_key(format!(
        "expected <tenant>{}<product>, got {:?}",
        KEY_SEPARATOR, product_key
    ))
}

fn split(product_key: &str) -> Option<(&str, &str)> {
    product_key
        .split_once(KEY_SEPARATOR)
        .filter(|(tenant, product)| !tenant.is_empty() && !product.is_empty())
}
