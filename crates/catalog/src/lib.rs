//! Catalog composition domain module.
//!
//! This crate contains the business rules for the catalog: product and
//! variation records, write normalization of coupled fields, packaging
//! consumption sets, and the composite/raw-material stock derivation. Pure
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod category;
pub mod composition;
pub mod packaging;
pub mod product;
pub mod variation;

pub use category::{CategoryRecord, UNCATEGORIZED, display_name};
pub use composition::{
    CompositionView, Listing, effective_price, effective_stock, ensure_acyclic,
    raw_material_units, resolve_listing,
};
pub use packaging::{PackagingLinkDraft, PackagingLinkRecord, sanitize_links};
pub use product::{ProductDraft, ProductRecord};
pub use variation::{CompositeSpec, RawMaterial, VariationDraft, VariationRecord};
