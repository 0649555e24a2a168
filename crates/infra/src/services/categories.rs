//! Category registry.
//!
//! Flat, store-scoped labels. Deleting one never cascades: products keep
//! their (now dangling) reference and readers resolve it to "Uncategorized"
//! lazily.

use std::sync::Arc;

use tracing::warn;

use storecraft_catalog::{CategoryRecord, category};
use storecraft_core::{CatalogError, CatalogResult, CategoryId, StoreId};

use crate::notify::{NotificationSink, Severity};
use crate::store::CatalogStore;

pub struct CategoryService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
}

impl<S, N> CategoryService<S, N>
where
    S: CatalogStore,
    N: NotificationSink,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self { store, notifier }
    }

    pub async fn create(&self, store_id: StoreId, name: &str) -> CatalogResult<CategoryRecord> {
        match self.try_create(store_id, name).await {
            Ok(record) => {
                self.notifier
                    .notify(Severity::Info, "Category created", &record.name);
                Ok(record)
            }
            Err(err) => {
                self.notifier
                    .notify(Severity::Error, "Failed to create category", &err.to_string());
                Err(err)
            }
        }
    }

    async fn try_create(&self, store_id: StoreId, name: &str) -> CatalogResult<CategoryRecord> {
        let record = CategoryRecord::new(CategoryId::new(), store_id, name)?;
        self.store.insert_category(record.clone()).await?;
        Ok(record)
    }

    pub async fn rename(
        &self,
        store_id: StoreId,
        id: CategoryId,
        name: &str,
    ) -> CatalogResult<CategoryRecord> {
        match self.try_rename(store_id, id, name).await {
            Ok(record) => {
                self.notifier
                    .notify(Severity::Info, "Category renamed", &record.name);
                Ok(record)
            }
            Err(err) => {
                self.notifier
                    .notify(Severity::Error, "Failed to rename category", &err.to_string());
                Err(err)
            }
        }
    }

    async fn try_rename(
        &self,
        store_id: StoreId,
        id: CategoryId,
        name: &str,
    ) -> CatalogResult<CategoryRecord> {
        let existing = self
            .store
            .fetch_category(store_id, id)
            .await?
            .ok_or_else(CatalogError::not_found)?;
        let record = CategoryRecord::new(existing.id, existing.store_id, name)?;
        self.store.update_category(record.clone()).await?;
        Ok(record)
    }

    /// Deletes the label only. Dependent products are untouched by design of
    /// the registry; their reference resolves to "Uncategorized" on next read.
    pub async fn delete(&self, store_id: StoreId, id: CategoryId) -> CatalogResult<()> {
        match self.try_delete(store_id, id).await {
            Ok(()) => {
                self.notifier
                    .notify(Severity::Info, "Category deleted", "products keep their rows");
                Ok(())
            }
            Err(err) => {
                self.notifier
                    .notify(Severity::Error, "Failed to delete category", &err.to_string());
                Err(err)
            }
        }
    }

    async fn try_delete(&self, store_id: StoreId, id: CategoryId) -> CatalogResult<()> {
        self.store
            .fetch_category(store_id, id)
            .await?
            .ok_or_else(CatalogError::not_found)?;
        self.store.delete_category(store_id, id).await?;
        Ok(())
    }

    /// Name-ordered listing. A prefetch failure degrades to an empty list
    /// instead of blocking the caller.
    pub async fn list(&self, store_id: StoreId) -> Vec<CategoryRecord> {
        match self.store.list_categories(store_id).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(%store_id, error = %err, "category prefetch failed");
                Vec::new()
            }
        }
    }

    /// Resolve a product's category reference for display.
    pub async fn display_name_for(
        &self,
        store_id: StoreId,
        category_id: Option<CategoryId>,
    ) -> CatalogResult<String> {
        let record = match category_id {
            None => None,
            Some(id) => self.store.fetch_category(store_id, id).await?,
        };
        Ok(category::display_name(record.as_ref()).to_string())
    }
}
