//! Multi-tenant Product aggregate with composite-key persistence.
//!
//! A product is identified by the composite key `<tenant>:<product>`, owns an
//! ordered backlog of items keyed `<productKey>-<n>`, and is stored through
//! the [`application::ProductRepository`] port.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
