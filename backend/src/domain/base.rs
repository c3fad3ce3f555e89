/// Base DDD abstractions for the domain layer
use std::fmt::Debug;
use thiserror::Error;

/// Trait for value objects - immutable objects defined by their attributes
/// Value objects are equal if all their attributes are equal
pub trait ValueObject: Clone + PartialEq + Eq + Debug {}

/// Trait for entities - objects with identity that can change over time
/// Entities are equal if their IDs are equal, regardless of other attributes
pub trait Entity: Debug {
    type Id: ValueObject;

    fn id(&self) -> &Self::Id;
}

/// Trait for aggregate roots - entities that are the entry point to an aggregate
/// Aggregates ensure consistency boundaries and encapsulate business rules
pub trait AggregateRoot: Entity {
    /// Structural comparison of the root's own attributes.
    ///
    /// Unlike `==`, which only looks at identity, this compares every scalar
    /// attribute of the root. Child collections are not part of the comparison.
    fn has_same_state(&self, other: &Self) -> bool;
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A required attribute was missing or empty
    #[error("Required attribute missing: {0}")]
    NullAttribute(String),
    /// An absent or inconsistent state was installed into an aggregate
    #[error("Invalid state: {0}")]
    InvalidState(String),
    /// A composite key did not match `<tenant>:<product>`
    #[error("Malformed key: {0}")]
    MalformedKey(String),
    /// A lookup by identity matched nothing
    #[error("Not found: {0}")]
    NotFound(String),
    /// A read-only snapshot was asked to change
    #[error("Immutable view: {0}")]
    ImmutableView(String),
    /// The storage engine could not be reached or failed
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    /// The storage engine rejected a write
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl DomainError {
    pub fn null_attribute(msg: impl Into<String>) -> Self {
        Self::NullAttribute(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn malformed_key(msg: impl Into<String>) -> Self {
        Self::MalformedKey(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct TestId(String);
    impl ValueObject for TestId {}

    #[derive(Debug)]
    struct TestEntity {
        id: TestId,
        value: String,
    }

    impl Entity for TestEntity {
        type Id = TestId;

        fn id(&self) -> &Self::Id {
            &self.id
        }
    }

    #[test]
    fn test_entity_has_identity() {
        let entity1 = TestEntity {
            id: TestId("test-1".to_string()),
            value: "original".to_string(),
        };

        let entity2 = TestEntity {
            id: TestId("test-1".to_string()),
            value: "modified".to_string(),
        };

        assert_eq!(entity1.id(), entity2.id());
        assert_ne!(entity1.value, entity2.value);
    }

    #[test]
    fn test_domain_error_display() {
        let error = DomainError::malformed_key("no-colon");
        assert_eq!(error.to_string(), "Malformed key: no-colon");

        let error = DomainError::NotFound("Backlog item x".to_string());
        assert_eq!(error.to_string(), "Not found: Backlog item x");
    }
}
