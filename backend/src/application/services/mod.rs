pub mod products_service;

pub use products_service::{ProductsService, FIRST_BACKLOG_ITEM};
