//! Supplier offers consumed by the catalog.
//!
//! A product may bind to exactly one supplier offer to source its cost
//! price; the binding is a snapshot plus a weak reference, never ownership.

pub mod offer;

pub use offer::{OfferView, Supplier, SupplierOffer};
