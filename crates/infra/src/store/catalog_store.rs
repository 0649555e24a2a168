use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use storecraft_catalog::{CategoryRecord, PackagingLinkRecord, ProductRecord, VariationRecord};
use storecraft_core::{
    CatalogError, CategoryId, Entity, OrderLineId, ProductId, StoreId, SupplierId, SupplierOfferId,
    VariationId,
};
use storecraft_suppliers::{Supplier, SupplierOffer};

/// Result type for raw store calls.
pub type StoreResult<T> = Result<T, StoreError>;

/// A failed call against the persistence service.
///
/// Carries the operation name so multi-step cascades can report which step
/// broke.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{op}: {message}")]
pub struct StoreError {
    pub op: &'static str,
    pub message: String,
}

impl StoreError {
    pub fn new(op: &'static str, message: impl Into<String>) -> Self {
        Self {
            op,
            message: message.into(),
        }
    }
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        CatalogError::persistence(err.to_string())
    }
}

/// Minimal shape of a historical order line, as far as the catalog cares:
/// a row that references a product and must be removed before the product
/// row can go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineRef {
    pub id: OrderLineId,
    pub store_id: StoreId,
    pub product_id: ProductId,
}

impl Entity for OrderLineRef {
    type Id = OrderLineId;

    fn id(&self) -> OrderLineId {
        self.id
    }
}

/// The remote persistence service, reduced to the primitives the catalog
/// uses: per-entity collections keyed by store id, with filtered select,
/// ordered select, insert (single or batch), update-by-id and
/// delete-by-filter.
///
/// Every call is one request/response round trip; callers await each call
/// before issuing the next dependent one. There are no multi-call
/// transactions, so multi-step operations built on top of this trait are
/// sequential and non-atomic.
///
/// Implementations must enforce store isolation: a fetch with the wrong
/// `StoreId` behaves as if the record did not exist.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    // --- products ---
    async fn insert_product(&self, record: ProductRecord) -> StoreResult<()>;
    async fn update_product(&self, record: ProductRecord) -> StoreResult<()>;
    async fn fetch_product(
        &self,
        store_id: StoreId,
        id: ProductId,
    ) -> StoreResult<Option<ProductRecord>>;
    /// Name-ordered.
    async fn list_products(&self, store_id: StoreId) -> StoreResult<Vec<ProductRecord>>;
    async fn delete_product(&self, store_id: StoreId, id: ProductId) -> StoreResult<()>;

    // --- variations (store-scoped through their owning product) ---
    async fn insert_variation(&self, record: VariationRecord) -> StoreResult<()>;
    async fn update_variation(&self, record: VariationRecord) -> StoreResult<()>;
    async fn fetch_variation(&self, id: VariationId) -> StoreResult<Option<VariationRecord>>;
    /// Name-ordered.
    async fn list_variations(&self, product_id: ProductId) -> StoreResult<Vec<VariationRecord>>;
    /// Every variation of every product in the store (the composite picker
    /// query).
    async fn list_store_variations(&self, store_id: StoreId)
    -> StoreResult<Vec<VariationRecord>>;
    async fn delete_variation(&self, id: VariationId) -> StoreResult<()>;
    /// Delete-by-filter; returns the number of removed rows.
    async fn delete_variations_of(&self, product_id: ProductId) -> StoreResult<usize>;

    // --- categories ---
    async fn insert_category(&self, record: CategoryRecord) -> StoreResult<()>;
    async fn update_category(&self, record: CategoryRecord) -> StoreResult<()>;
    async fn fetch_category(
        &self,
        store_id: StoreId,
        id: CategoryId,
    ) -> StoreResult<Option<CategoryRecord>>;
    /// Name-ordered.
    async fn list_categories(&self, store_id: StoreId) -> StoreResult<Vec<CategoryRecord>>;
    async fn delete_category(&self, store_id: StoreId, id: CategoryId) -> StoreResult<()>;

    // --- packaging links ---
    async fn insert_packaging_links(&self, links: Vec<PackagingLinkRecord>) -> StoreResult<()>;
    async fn list_packaging_links(
        &self,
        store_id: StoreId,
        packaging_id: ProductId,
    ) -> StoreResult<Vec<PackagingLinkRecord>>;
    /// Remove every link that names the product on either side; returns the
    /// number of removed rows.
    async fn delete_packaging_links_for(
        &self,
        store_id: StoreId,
        product_id: ProductId,
    ) -> StoreResult<usize>;

    // --- suppliers and offers (consumed collections) ---
    async fn insert_supplier(&self, record: Supplier) -> StoreResult<()>;
    async fn insert_offer(&self, record: SupplierOffer) -> StoreResult<()>;
    /// Ordered by corporate name.
    async fn list_suppliers(&self, store_id: StoreId) -> StoreResult<Vec<Supplier>>;
    async fn list_offers(
        &self,
        store_id: StoreId,
        supplier_id: SupplierId,
    ) -> StoreResult<Vec<SupplierOffer>>;
    async fn fetch_offer(
        &self,
        store_id: StoreId,
        id: SupplierOfferId,
    ) -> StoreResult<Option<SupplierOffer>>;

    // --- historical order lines ---
    async fn insert_order_line(&self, record: OrderLineRef) -> StoreResult<()>;
    async fn list_order_lines_for(
        &self,
        store_id: StoreId,
        product_id: ProductId,
    ) -> StoreResult<Vec<OrderLineRef>>;
    /// Delete-by-filter; returns the number of removed rows.
    async fn delete_order_lines_for(
        &self,
        store_id: StoreId,
        product_id: ProductId,
    ) -> StoreResult<usize>;
}
