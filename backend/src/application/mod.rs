pub mod dto;
pub mod repositories;
pub mod services;

pub use dto::{BacklogItemView, ProductView};
pub use repositories::ProductRepository;
pub use services::{ProductsService, FIRST_BACKLOG_ITEM};
