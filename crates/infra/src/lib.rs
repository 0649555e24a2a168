//! Infrastructure layer: persistence abstractions, notification sinks, and
//! the catalog's operation surface.

pub mod cascade;
pub mod notify;
pub mod services;
pub mod store;

#[cfg(test)]
mod integration_tests;

pub use cascade::{CascadeReport, CascadeStep, DeletionState, DeletionWorkflow};
pub use notify::{Notification, NotificationSink, RecordingSink, Severity, TracingSink};
pub use services::{CatalogService, CategoryService, LabelledVariation, SupplierOfferService};
pub use store::{CatalogStore, InMemoryCatalogStore, OrderLineRef, StoreError, StoreResult};
