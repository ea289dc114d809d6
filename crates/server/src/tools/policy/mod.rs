//! Policy document tools: lookup, listing, search, and the category catalog.

pub mod categories;
pub mod get;
pub mod list;
pub mod search;

pub use categories::categories_impl;
pub use get::{PolicyGetParams, get_impl};
pub use list::{PolicyListParams, list_impl};
pub use search::{PolicySearchParams, search_impl};
