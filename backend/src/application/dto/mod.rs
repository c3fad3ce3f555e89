mod product;

pub use product::{BacklogItemView, ProductView};
