//! Supplier offer resolver.
//!
//! Lets a product bind to exactly one (supplier, product, cost) offer as its
//! cost source. Binding snapshots the offer's cost into the product's own
//! `cost_price`; the reference is retained for re-derivation.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::warn;

use storecraft_core::{CatalogError, CatalogResult, ProductId, StoreId, SupplierId, SupplierOfferId};
use storecraft_suppliers::{OfferView, Supplier};

use crate::notify::{NotificationSink, Severity};
use crate::store::CatalogStore;

pub struct SupplierOfferService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
}

impl<S, N> SupplierOfferService<S, N>
where
    S: CatalogStore,
    N: NotificationSink,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self { store, notifier }
    }

    /// Ordered by corporate name. Degrades to an empty list on a prefetch
    /// failure instead of blocking the caller.
    pub async fn list_suppliers(&self, store_id: StoreId) -> Vec<Supplier> {
        match self.store.list_suppliers(store_id).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(%store_id, error = %err, "supplier prefetch failed");
                Vec::new()
            }
        }
    }

    /// All offers of one supplier, each carrying the referenced product's
    /// display name and nullable cost.
    pub async fn list_offers(
        &self,
        store_id: StoreId,
        supplier_id: SupplierId,
    ) -> CatalogResult<Vec<OfferView>> {
        let offers = self.store.list_offers(store_id, supplier_id).await?;
        let mut views = Vec::with_capacity(offers.len());
        for offer in offers {
            let product_name = self
                .store
                .fetch_product(store_id, offer.product_id)
                .await?
                .map(|p| p.name)
                .unwrap_or_else(|| "Unknown product".to_string());
            views.push(OfferView {
                offer,
                product_name,
            });
        }
        Ok(views)
    }

    /// Bind the product to an offer (or unbind with `None`).
    ///
    /// A pure selection: an offer id that no longer resolves is not an
    /// error; the reference is stored as given and the cost is simply not
    /// snapshotted. Returns the snapshotted cost, if any, so callers can
    /// surface it.
    pub async fn bind(
        &self,
        store_id: StoreId,
        product_id: ProductId,
        offer_id: Option<SupplierOfferId>,
    ) -> CatalogResult<Option<Decimal>> {
        match self.try_bind(store_id, product_id, offer_id).await {
            Ok(cost) => {
                let title = if offer_id.is_some() {
                    "Supplier offer linked"
                } else {
                    "Supplier offer unlinked"
                };
                self.notifier.notify(Severity::Info, title, "");
                Ok(cost)
            }
            Err(err) => {
                self.notifier.notify(
                    Severity::Error,
                    "Failed to link supplier offer",
                    &err.to_string(),
                );
                Err(err)
            }
        }
    }

    async fn try_bind(
        &self,
        store_id: StoreId,
        product_id: ProductId,
        offer_id: Option<SupplierOfferId>,
    ) -> CatalogResult<Option<Decimal>> {
        let mut product = self
            .store
            .fetch_product(store_id, product_id)
            .await?
            .ok_or_else(CatalogError::not_found)?;

        let snapshot = match offer_id {
            None => None,
            Some(id) => match self.store.fetch_offer(store_id, id).await? {
                Some(offer) => offer.cost_snapshot(),
                None => None,
            },
        };

        product.supplier_offer_id = offer_id;
        if let Some(cost) = snapshot {
            product.cost_price = cost;
        }
        self.store.update_product(product).await?;
        Ok(snapshot)
    }
}
