//! Catalog service: products, variations, packaging links.
//!
//! Threads the owning store id through every operation, normalizes every
//! write through the domain drafts, and runs reference/cycle checks before
//! the first store call. Mutation outcomes are reported to the notification
//! sink and traced.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use storecraft_catalog::{
    CompositionView, Listing, PackagingLinkDraft, PackagingLinkRecord, ProductDraft,
    ProductRecord, RawMaterial, VariationDraft, VariationRecord, composition, sanitize_links,
};
use storecraft_core::{
    CatalogError, CatalogResult, PackagingLinkId, ProductId, StoreId, VariationId,
};

use crate::cascade::{CascadeReport, CascadeStep, DeletionState, DeletionWorkflow};
use crate::notify::{NotificationSink, Severity};
use crate::store::CatalogStore;

/// A variation labelled with its owning product's name, as listed for the
/// composite raw-material picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelledVariation {
    pub product_name: String,
    pub variation: VariationRecord,
}

/// Prefetched view of one store's catalog graph, used for cycle checks and
/// derived-stock resolution.
struct StoreSnapshot {
    products: HashMap<ProductId, ProductRecord>,
    variations: HashMap<VariationId, VariationRecord>,
}

impl CompositionView for StoreSnapshot {
    fn product(&self, id: ProductId) -> Option<&ProductRecord> {
        self.products.get(&id)
    }

    fn variation(&self, id: VariationId) -> Option<&VariationRecord> {
        self.variations.get(&id)
    }
}

pub struct CatalogService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
}

impl<S, N> CatalogService<S, N>
where
    S: CatalogStore,
    N: NotificationSink,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self { store, notifier }
    }

    async fn snapshot(&self, store_id: StoreId) -> CatalogResult<StoreSnapshot> {
        let products = self
            .store
            .list_products(store_id)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        let variations = self
            .store
            .list_store_variations(store_id)
            .await?
            .into_iter()
            .map(|v| (v.id, v))
            .collect();
        Ok(StoreSnapshot {
            products,
            variations,
        })
    }

    // --- products ---

    pub async fn list_products(&self, store_id: StoreId) -> CatalogResult<Vec<ProductRecord>> {
        Ok(self.store.list_products(store_id).await?)
    }

    pub async fn get_product(
        &self,
        store_id: StoreId,
        id: ProductId,
    ) -> CatalogResult<ProductRecord> {
        self.store
            .fetch_product(store_id, id)
            .await?
            .ok_or_else(CatalogError::not_found)
    }

    /// Create a product; for a packaging product, batch-insert its
    /// consumption links in the same operation.
    pub async fn create_product(
        &self,
        store_id: StoreId,
        draft: ProductDraft,
        links: Vec<PackagingLinkDraft>,
    ) -> CatalogResult<ProductRecord> {
        match self.try_create_product(store_id, draft, links).await {
            Ok(record) => {
                info!(%store_id, product_id = %record.id, "product created");
                self.notifier
                    .notify(Severity::Info, "Product added", &record.name);
                Ok(record)
            }
            Err(err) => {
                self.notifier
                    .notify(Severity::Error, "Failed to add product", &err.to_string());
                Err(err)
            }
        }
    }

    async fn try_create_product(
        &self,
        store_id: StoreId,
        draft: ProductDraft,
        links: Vec<PackagingLinkDraft>,
    ) -> CatalogResult<ProductRecord> {
        let record = draft.normalize(ProductId::new(), store_id, Utc::now())?;
        self.check_product_references(&record).await?;

        let link_records = if record.is_packaging {
            self.prepare_packaging_links(store_id, record.id, links)
                .await?
        } else {
            if !links.is_empty() {
                debug!(product_id = %record.id, "ignoring packaging links for non-packaging product");
            }
            Vec::new()
        };

        self.store.insert_product(record.clone()).await?;
        if !link_records.is_empty() {
            self.store.insert_packaging_links(link_records).await?;
        }
        Ok(record)
    }

    pub async fn update_product(
        &self,
        store_id: StoreId,
        id: ProductId,
        draft: ProductDraft,
    ) -> CatalogResult<ProductRecord> {
        match self.try_update_product(store_id, id, draft).await {
            Ok(record) => {
                info!(%store_id, product_id = %record.id, "product updated");
                self.notifier
                    .notify(Severity::Info, "Product updated", &record.name);
                Ok(record)
            }
            Err(err) => {
                self.notifier
                    .notify(Severity::Error, "Failed to update product", &err.to_string());
                Err(err)
            }
        }
    }

    async fn try_update_product(
        &self,
        store_id: StoreId,
        id: ProductId,
        draft: ProductDraft,
    ) -> CatalogResult<ProductRecord> {
        let existing = self
            .store
            .fetch_product(store_id, id)
            .await?
            .ok_or_else(CatalogError::not_found)?;
        let record = draft.normalize(existing.id, store_id, existing.created_at)?;
        self.check_product_references(&record).await?;
        self.store.update_product(record.clone()).await?;
        Ok(record)
    }

    async fn check_product_references(&self, record: &ProductRecord) -> CatalogResult<()> {
        if let Some(category_id) = record.category_id {
            self.store
                .fetch_category(record.store_id, category_id)
                .await?
                .ok_or_else(|| {
                    CatalogError::reference(format!("category {category_id} not found"))
                })?;
        }
        if let Some(offer_id) = record.supplier_offer_id {
            self.store
                .fetch_offer(record.store_id, offer_id)
                .await?
                .ok_or_else(|| {
                    CatalogError::reference(format!("supplier offer {offer_id} not found"))
                })?;
        }
        Ok(())
    }

    /// Sanitize and reference-check a packaging batch before any write.
    ///
    /// Incomplete rows (no target, non-positive quantity) are dropped
    /// silently; the survivors must reference existing in-store products at
    /// purchasable-item granularity (no variation groups).
    async fn prepare_packaging_links(
        &self,
        store_id: StoreId,
        packaging_id: ProductId,
        links: Vec<PackagingLinkDraft>,
    ) -> CatalogResult<Vec<PackagingLinkRecord>> {
        let mut records = Vec::new();
        for (product_id, quantity) in sanitize_links(links) {
            let target = self
                .store
                .fetch_product(store_id, product_id)
                .await?
                .ok_or_else(|| {
                    CatalogError::reference(format!("linked product {product_id} not found"))
                })?;
            if target.has_variations {
                return Err(CatalogError::validation(
                    "packaging links target purchasable items, not variation groups",
                ));
            }
            records.push(PackagingLinkRecord {
                id: PackagingLinkId::new(),
                store_id,
                packaging_id,
                product_id,
                quantity,
            });
        }
        Ok(records)
    }

    pub async fn packaging_links(
        &self,
        store_id: StoreId,
        packaging_id: ProductId,
    ) -> CatalogResult<Vec<PackagingLinkRecord>> {
        Ok(self
            .store
            .list_packaging_links(store_id, packaging_id)
            .await?)
    }

    /// Delete a product and everything that references it.
    ///
    /// `confirmed == false` stops at `Requested` without touching the store.
    /// Pre-write checks (existence, raw-material dependents) fail with a
    /// `CatalogError`; once the cascade starts, step failures are reported
    /// through the returned [`CascadeReport`] with prior steps' effects left
    /// in place.
    pub async fn delete_product(
        &self,
        store_id: StoreId,
        id: ProductId,
        confirmed: bool,
    ) -> CatalogResult<CascadeReport> {
        match self.try_delete_product(store_id, id, confirmed).await {
            Ok(report) => {
                match &report.state {
                    DeletionState::Committed => {
                        info!(%store_id, product_id = %id, ?report, "product deleted");
                        self.notifier.notify(
                            Severity::Info,
                            "Product deleted",
                            "associated variations and order lines were removed",
                        );
                    }
                    DeletionState::Failed { step, message } => {
                        self.notifier.notify(
                            Severity::Error,
                            "Failed to delete product",
                            &format!("{}: {}", step.describe(), message),
                        );
                    }
                    _ => {}
                }
                Ok(report)
            }
            Err(err) => {
                self.notifier
                    .notify(Severity::Error, "Failed to delete product", &err.to_string());
                Err(err)
            }
        }
    }

    async fn try_delete_product(
        &self,
        store_id: StoreId,
        id: ProductId,
        confirmed: bool,
    ) -> CatalogResult<CascadeReport> {
        self.store
            .fetch_product(store_id, id)
            .await?
            .ok_or_else(CatalogError::not_found)?;

        let mut workflow = DeletionWorkflow::request();
        if !confirmed {
            return Ok(CascadeReport::requested());
        }
        workflow.confirm();

        // The product and its variations must not be raw materials of
        // variations that survive the cascade.
        let snapshot = self.snapshot(store_id).await?;
        let own_variations: HashSet<VariationId> = snapshot
            .variations
            .values()
            .filter(|v| v.product_id == id)
            .map(|v| v.id)
            .collect();
        for variation in snapshot.variations.values() {
            if variation.product_id == id {
                continue;
            }
            let blocked = match variation.raw_material() {
                Some(RawMaterial::Product(p)) => p == id,
                Some(RawMaterial::Variation(v)) => own_variations.contains(&v),
                None => false,
            };
            if blocked {
                return Err(CatalogError::precondition(format!(
                    "product is still referenced as raw material by variation '{}'",
                    variation.name
                )));
            }
        }

        workflow.begin_cascade();

        let removed_variations = match self.store.delete_variations_of(id).await {
            Ok(n) => n,
            Err(err) => {
                workflow.fail(CascadeStep::Variations, err.to_string());
                return Ok(CascadeReport {
                    state: workflow.state().clone(),
                    removed_variations: 0,
                    removed_order_lines: 0,
                    removed_packaging_links: 0,
                });
            }
        };

        let removed_order_lines = match self.store.delete_order_lines_for(store_id, id).await {
            Ok(n) => n,
            Err(err) => {
                workflow.fail(CascadeStep::OrderLines, err.to_string());
                return Ok(CascadeReport {
                    state: workflow.state().clone(),
                    removed_variations,
                    removed_order_lines: 0,
                    removed_packaging_links: 0,
                });
            }
        };

        let removed_packaging_links =
            match self.store.delete_packaging_links_for(store_id, id).await {
                Ok(n) => n,
                Err(err) => {
                    workflow.fail(CascadeStep::PackagingLinks, err.to_string());
                    return Ok(CascadeReport {
                        state: workflow.state().clone(),
                        removed_variations,
                        removed_order_lines,
                        removed_packaging_links: 0,
                    });
                }
            };

        if let Err(err) = self.store.delete_product(store_id, id).await {
            workflow.fail(CascadeStep::Product, err.to_string());
            return Ok(CascadeReport {
                state: workflow.state().clone(),
                removed_variations,
                removed_order_lines,
                removed_packaging_links,
            });
        }

        workflow.commit();
        Ok(CascadeReport {
            state: workflow.state().clone(),
            removed_variations,
            removed_order_lines,
            removed_packaging_links,
        })
    }

    // --- variations ---

    pub async fn list_variations(
        &self,
        store_id: StoreId,
        product_id: ProductId,
    ) -> CatalogResult<Vec<VariationRecord>> {
        self.store
            .fetch_product(store_id, product_id)
            .await?
            .ok_or_else(CatalogError::not_found)?;
        Ok(self.store.list_variations(product_id).await?)
    }

    /// Every variation in the store, labelled with its owning product's
    /// name and ordered by that label (the raw-material picker listing).
    pub async fn list_all_variations(
        &self,
        store_id: StoreId,
    ) -> CatalogResult<Vec<LabelledVariation>> {
        let snapshot = self.snapshot(store_id).await?;
        let mut rows: Vec<LabelledVariation> = snapshot
            .variations
            .values()
            .map(|variation| LabelledVariation {
                product_name: snapshot
                    .products
                    .get(&variation.product_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_default(),
                variation: variation.clone(),
            })
            .collect();
        rows.sort_by(|a, b| {
            (&a.product_name, &a.variation.name).cmp(&(&b.product_name, &b.variation.name))
        });
        Ok(rows)
    }

    pub async fn add_variation(
        &self,
        store_id: StoreId,
        product_id: ProductId,
        draft: VariationDraft,
    ) -> CatalogResult<VariationRecord> {
        match self.try_add_variation(store_id, product_id, draft).await {
            Ok(record) => {
                info!(%store_id, variation_id = %record.id, "variation added");
                self.notifier
                    .notify(Severity::Info, "Variation added", &record.name);
                Ok(record)
            }
            Err(err) => {
                self.notifier
                    .notify(Severity::Error, "Failed to add variation", &err.to_string());
                Err(err)
            }
        }
    }

    async fn try_add_variation(
        &self,
        store_id: StoreId,
        product_id: ProductId,
        draft: VariationDraft,
    ) -> CatalogResult<VariationRecord> {
        self.store
            .fetch_product(store_id, product_id)
            .await?
            .ok_or_else(CatalogError::not_found)?;

        let record = draft.normalize(VariationId::new(), product_id)?;
        if let Some(raw) = record.raw_material() {
            self.check_raw_material(store_id, record.id, &raw).await?;
        }
        self.store.insert_variation(record.clone()).await?;
        Ok(record)
    }

    pub async fn update_variation(
        &self,
        store_id: StoreId,
        variation_id: VariationId,
        draft: VariationDraft,
    ) -> CatalogResult<VariationRecord> {
        match self
            .try_update_variation(store_id, variation_id, draft)
            .await
        {
            Ok(record) => {
                info!(%store_id, variation_id = %record.id, "variation updated");
                self.notifier
                    .notify(Severity::Info, "Variation updated", &record.name);
                Ok(record)
            }
            Err(err) => {
                self.notifier.notify(
                    Severity::Error,
                    "Failed to update variation",
                    &err.to_string(),
                );
                Err(err)
            }
        }
    }

    async fn try_update_variation(
        &self,
        store_id: StoreId,
        variation_id: VariationId,
        draft: VariationDraft,
    ) -> CatalogResult<VariationRecord> {
        let existing = self.owned_variation(store_id, variation_id).await?;
        let record = draft.normalize(existing.id, existing.product_id)?;
        if let Some(raw) = record.raw_material() {
            self.check_raw_material(store_id, record.id, &raw).await?;
        }
        self.store.update_variation(record.clone()).await?;
        Ok(record)
    }

    /// Deleting a variation that other variations consume as raw material is
    /// refused; the dependents must be rewired or removed first.
    pub async fn delete_variation(
        &self,
        store_id: StoreId,
        variation_id: VariationId,
    ) -> CatalogResult<()> {
        match self.try_delete_variation(store_id, variation_id).await {
            Ok(()) => {
                info!(%store_id, %variation_id, "variation deleted");
                self.notifier.notify(Severity::Info, "Variation deleted", "");
                Ok(())
            }
            Err(err) => {
                self.notifier.notify(
                    Severity::Error,
                    "Failed to delete variation",
                    &err.to_string(),
                );
                Err(err)
            }
        }
    }

    async fn try_delete_variation(
        &self,
        store_id: StoreId,
        variation_id: VariationId,
    ) -> CatalogResult<()> {
        self.owned_variation(store_id, variation_id).await?;

        let dependents = self.store.list_store_variations(store_id).await?;
        if let Some(dependent) = dependents.iter().find(|v| {
            v.id != variation_id && v.raw_material_variation_id == Some(variation_id)
        }) {
            return Err(CatalogError::precondition(format!(
                "variation is still referenced as raw material by '{}'",
                dependent.name
            )));
        }

        self.store.delete_variation(variation_id).await?;
        Ok(())
    }

    /// Fetch a variation and verify it belongs to the given store.
    async fn owned_variation(
        &self,
        store_id: StoreId,
        variation_id: VariationId,
    ) -> CatalogResult<VariationRecord> {
        let variation = self
            .store
            .fetch_variation(variation_id)
            .await?
            .ok_or_else(CatalogError::not_found)?;
        self.store
            .fetch_product(store_id, variation.product_id)
            .await?
            .ok_or_else(CatalogError::not_found)?;
        Ok(variation)
    }

    /// Validate a raw-material edge before it is written: the source must
    /// live in this store's catalog and the resulting chain must stay
    /// acyclic.
    async fn check_raw_material(
        &self,
        store_id: StoreId,
        candidate: VariationId,
        raw: &RawMaterial,
    ) -> CatalogResult<()> {
        let snapshot = self.snapshot(store_id).await?;
        match raw {
            RawMaterial::Product(p) => {
                if snapshot.product(*p).is_none() {
                    return Err(CatalogError::reference(format!(
                        "raw-material product {p} is not in this store's catalog"
                    )));
                }
            }
            RawMaterial::Variation(v) => {
                if *v != candidate && snapshot.variation(*v).is_none() {
                    return Err(CatalogError::reference(format!(
                        "raw-material variation {v} is not in this store's catalog"
                    )));
                }
            }
        }
        composition::ensure_acyclic(&snapshot, candidate, raw)
    }

    // --- listings ---

    /// Effective price and stock for a product or one of its variations.
    pub async fn resolve_listing(
        &self,
        store_id: StoreId,
        product_id: ProductId,
        variation_id: Option<VariationId>,
    ) -> CatalogResult<Listing> {
        let product = self
            .store
            .fetch_product(store_id, product_id)
            .await?
            .ok_or_else(CatalogError::not_found)?;

        let variation = match variation_id {
            None => None,
            Some(id) => {
                let v = self
                    .store
                    .fetch_variation(id)
                    .await?
                    .ok_or_else(CatalogError::not_found)?;
                if v.product_id != product_id {
                    return Err(CatalogError::reference(format!(
                        "variation {id} does not belong to product {product_id}"
                    )));
                }
                Some(v)
            }
        };

        let snapshot = self.snapshot(store_id).await?;
        composition::resolve_listing(&snapshot, &product, variation.as_ref())
    }
}
