use serde::{Deserialize, Serialize};

use storecraft_core::{CatalogError, CatalogResult, CategoryId, Entity, StoreId};

/// Label shown when a product's category reference is absent or dangling.
///
/// Category deletion never cascades; readers resolve a missing id to this
/// label lazily instead.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A flat classification label, store-scoped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: CategoryId,
    pub store_id: StoreId,
    pub name: String,
}

impl CategoryRecord {
    pub fn new(id: CategoryId, store_id: StoreId, name: impl Into<String>) -> CatalogResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CatalogError::validation("category name cannot be empty"));
        }
        Ok(Self { id, store_id, name })
    }
}

impl Entity for CategoryRecord {
    type Id = CategoryId;

    fn id(&self) -> CategoryId {
        self.id
    }
}

/// Resolve a (possibly missing) category record to a display name.
pub fn display_name(category: Option<&CategoryRecord>) -> &str {
    category.map(|c| c.name.as_str()).unwrap_or(UNCATEGORIZED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_category_rejects_empty_name() {
        let err = CategoryRecord::new(CategoryId::new(), StoreId::new(), "   ").unwrap_err();
        match err {
            CatalogError::Validation(_) => {}
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn missing_category_renders_uncategorized() {
        assert_eq!(display_name(None), UNCATEGORIZED);

        let cat = CategoryRecord::new(CategoryId::new(), StoreId::new(), "Drinks").unwrap();
        assert_eq!(display_name(Some(&cat)), "Drinks");
    }
}
