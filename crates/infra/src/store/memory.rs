use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use storecraft_catalog::{CategoryRecord, PackagingLinkRecord, ProductRecord, VariationRecord};
use storecraft_core::{
    CategoryId, Entity, OrderLineId, PackagingLinkId, ProductId, StoreId, SupplierId,
    SupplierOfferId, VariationId,
};
use storecraft_suppliers::{Supplier, SupplierOffer};

use super::catalog_store::{CatalogStore, OrderLineRef, StoreError, StoreResult};

#[derive(Debug, Default)]
struct State {
    products: HashMap<ProductId, ProductRecord>,
    variations: HashMap<VariationId, VariationRecord>,
    categories: HashMap<CategoryId, CategoryRecord>,
    packaging_links: HashMap<PackagingLinkId, PackagingLinkRecord>,
    suppliers: HashMap<SupplierId, Supplier>,
    offers: HashMap<SupplierOfferId, SupplierOffer>,
    order_lines: HashMap<OrderLineId, OrderLineRef>,
}

impl State {
    fn owner_store(&self, variation: &VariationRecord) -> Option<StoreId> {
        self.products.get(&variation.product_id).map(|p| p.store_id)
    }

    fn offer_store(&self, offer: &SupplierOffer) -> Option<StoreId> {
        self.suppliers.get(&offer.supplier_id).map(|s| s.store_id)
    }
}

fn upsert<E: Entity>(map: &mut HashMap<E::Id, E>, record: E) {
    map.insert(record.id(), record);
}

/// In-memory catalog store.
///
/// Intended for tests/dev. Enforces store isolation the way a real backend
/// would: records fetched with the wrong store id behave as absent.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    state: RwLock<State>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| StoreError::new("memory.read", "lock poisoned"))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| StoreError::new("memory.write", "lock poisoned"))
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn insert_product(&self, record: ProductRecord) -> StoreResult<()> {
        upsert(&mut self.write()?.products, record);
        Ok(())
    }

    async fn update_product(&self, record: ProductRecord) -> StoreResult<()> {
        upsert(&mut self.write()?.products, record);
        Ok(())
    }

    async fn fetch_product(
        &self,
        store_id: StoreId,
        id: ProductId,
    ) -> StoreResult<Option<ProductRecord>> {
        let state = self.read()?;
        Ok(state
            .products
            .get(&id)
            .filter(|p| p.store_id == store_id)
            .cloned())
    }

    async fn list_products(&self, store_id: StoreId) -> StoreResult<Vec<ProductRecord>> {
        let state = self.read()?;
        let mut rows: Vec<_> = state
            .products
            .values()
            .filter(|p| p.store_id == store_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn delete_product(&self, store_id: StoreId, id: ProductId) -> StoreResult<()> {
        let mut state = self.write()?;
        if state
            .products
            .get(&id)
            .is_some_and(|p| p.store_id == store_id)
        {
            state.products.remove(&id);
        }
        Ok(())
    }

    async fn insert_variation(&self, record: VariationRecord) -> StoreResult<()> {
        upsert(&mut self.write()?.variations, record);
        Ok(())
    }

    async fn update_variation(&self, record: VariationRecord) -> StoreResult<()> {
        upsert(&mut self.write()?.variations, record);
        Ok(())
    }

    async fn fetch_variation(&self, id: VariationId) -> StoreResult<Option<VariationRecord>> {
        Ok(self.read()?.variations.get(&id).cloned())
    }

    async fn list_variations(&self, product_id: ProductId) -> StoreResult<Vec<VariationRecord>> {
        let state = self.read()?;
        let mut rows: Vec<_> = state
            .variations
            .values()
            .filter(|v| v.product_id == product_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn list_store_variations(
        &self,
        store_id: StoreId,
    ) -> StoreResult<Vec<VariationRecord>> {
        let state = self.read()?;
        Ok(state
            .variations
            .values()
            .filter(|v| state.owner_store(v) == Some(store_id))
            .cloned()
            .collect())
    }

    async fn delete_variation(&self, id: VariationId) -> StoreResult<()> {
        self.write()?.variations.remove(&id);
        Ok(())
    }

    async fn delete_variations_of(&self, product_id: ProductId) -> StoreResult<usize> {
        let mut state = self.write()?;
        let before = state.variations.len();
        state.variations.retain(|_, v| v.product_id != product_id);
        Ok(before - state.variations.len())
    }

    async fn insert_category(&self, record: CategoryRecord) -> StoreResult<()> {
        upsert(&mut self.write()?.categories, record);
        Ok(())
    }

    async fn update_category(&self, record: CategoryRecord) -> StoreResult<()> {
        upsert(&mut self.write()?.categories, record);
        Ok(())
    }

    async fn fetch_category(
        &self,
        store_id: StoreId,
        id: CategoryId,
    ) -> StoreResult<Option<CategoryRecord>> {
        let state = self.read()?;
        Ok(state
            .categories
            .get(&id)
            .filter(|c| c.store_id == store_id)
            .cloned())
    }

    async fn list_categories(&self, store_id: StoreId) -> StoreResult<Vec<CategoryRecord>> {
        let state = self.read()?;
        let mut rows: Vec<_> = state
            .categories
            .values()
            .filter(|c| c.store_id == store_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn delete_category(&self, store_id: StoreId, id: CategoryId) -> StoreResult<()> {
        let mut state = self.write()?;
        if state
            .categories
            .get(&id)
            .is_some_and(|c| c.store_id == store_id)
        {
            state.categories.remove(&id);
        }
        Ok(())
    }

    async fn insert_packaging_links(&self, links: Vec<PackagingLinkRecord>) -> StoreResult<()> {
        let mut state = self.write()?;
        for link in links {
            upsert(&mut state.packaging_links, link);
        }
        Ok(())
    }

    async fn list_packaging_links(
        &self,
        store_id: StoreId,
        packaging_id: ProductId,
    ) -> StoreResult<Vec<PackagingLinkRecord>> {
        let state = self.read()?;
        Ok(state
            .packaging_links
            .values()
            .filter(|l| l.store_id == store_id && l.packaging_id == packaging_id)
            .cloned()
            .collect())
    }

    async fn delete_packaging_links_for(
        &self,
        store_id: StoreId,
        product_id: ProductId,
    ) -> StoreResult<usize> {
        let mut state = self.write()?;
        let before = state.packaging_links.len();
        state.packaging_links.retain(|_, l| {
            l.store_id != store_id || (l.packaging_id != product_id && l.product_id != product_id)
        });
        Ok(before - state.packaging_links.len())
    }

    async fn insert_supplier(&self, record: Supplier) -> StoreResult<()> {
        upsert(&mut self.write()?.suppliers, record);
        Ok(())
    }

    async fn insert_offer(&self, record: SupplierOffer) -> StoreResult<()> {
        upsert(&mut self.write()?.offers, record);
        Ok(())
    }

    async fn list_suppliers(&self, store_id: StoreId) -> StoreResult<Vec<Supplier>> {
        let state = self.read()?;
        let mut rows: Vec<_> = state
            .suppliers
            .values()
            .filter(|s| s.store_id == store_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.corporate_name.cmp(&b.corporate_name));
        Ok(rows)
    }

    async fn list_offers(
        &self,
        store_id: StoreId,
        supplier_id: SupplierId,
    ) -> StoreResult<Vec<SupplierOffer>> {
        let state = self.read()?;
        Ok(state
            .offers
            .values()
            .filter(|o| o.supplier_id == supplier_id && state.offer_store(o) == Some(store_id))
            .cloned()
            .collect())
    }

    async fn fetch_offer(
        &self,
        store_id: StoreId,
        id: SupplierOfferId,
    ) -> StoreResult<Option<SupplierOffer>> {
        let state = self.read()?;
        Ok(state
            .offers
            .get(&id)
            .filter(|o| state.offer_store(o) == Some(store_id))
            .cloned())
    }

    async fn insert_order_line(&self, record: OrderLineRef) -> StoreResult<()> {
        upsert(&mut self.write()?.order_lines, record);
        Ok(())
    }

    async fn list_order_lines_for(
        &self,
        store_id: StoreId,
        product_id: ProductId,
    ) -> StoreResult<Vec<OrderLineRef>> {
        let state = self.read()?;
        Ok(state
            .order_lines
            .values()
            .filter(|l| l.store_id == store_id && l.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn delete_order_lines_for(
        &self,
        store_id: StoreId,
        product_id: ProductId,
    ) -> StoreResult<usize> {
        let mut state = self.write()?;
        let before = state.order_lines.len();
        state
            .order_lines
            .retain(|_, l| l.store_id != store_id || l.product_id != product_id);
        Ok(before - state.order_lines.len())
    }
}
