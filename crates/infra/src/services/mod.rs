//! Operation surface over the persistence service.

pub mod catalog;
pub mod categories;
pub mod suppliers;

pub use catalog::{CatalogService, LabelledVariation};
pub use categories::CategoryService;
pub use suppliers::SupplierOfferService;
