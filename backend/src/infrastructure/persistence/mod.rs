mod in_memory_product_repository;
mod schema;
mod sqlite_product_repository;

pub use in_memory_product_repository::InMemoryProductRepository;
pub use schema::initialize_database;
pub use sqlite_product_repository::SqliteProductRepository;
