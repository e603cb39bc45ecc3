pub mod builtin;
pub mod catalog;
pub mod simple;

pub use catalog::{Catalog, CatalogError};
pub use simple::{SimpleFunc, SimpleRegistry, StaticFunc};
