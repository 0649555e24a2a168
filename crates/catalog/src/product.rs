use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storecraft_core::{
    CatalogError, CatalogResult, CategoryId, Entity, ProductId, StoreId, SupplierOfferId,
};

/// A product row as persisted, store-scoped.
///
/// When `has_variations` is set the product is a pure grouping node: its own
/// `price` and `stock_quantity` are inert (held at zero) and the sellable
/// state lives in its variations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub store_id: StoreId,
    pub name: String,
    pub price: Decimal,
    pub cost_price: Decimal,
    pub stock_quantity: u32,
    pub active: bool,
    pub image_url: Option<String>,
    pub category_id: Option<CategoryId>,
    pub earns_loyalty_points: bool,
    pub loyalty_points_value: Decimal,
    pub can_be_redeemed_with_points: bool,
    pub redemption_points_cost: u32,
    pub has_variations: bool,
    pub is_perishable: bool,
    pub is_packaging: bool,
    pub supplier_offer_id: Option<SupplierOfferId>,
    pub created_at: DateTime<Utc>,
}

impl Entity for ProductRecord {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

/// Caller-supplied product fields, before normalization.
///
/// Drafts are what forms collect; [`ProductDraft::normalize`] is the single
/// write path that derives coupled fields, so no call site can persist a
/// record that violates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub price: Decimal,
    pub cost_price: Decimal,
    pub stock_quantity: u32,
    pub active: bool,
    pub image_url: Option<String>,
    pub category_id: Option<CategoryId>,
    pub loyalty_points_value: Decimal,
    pub can_be_redeemed_with_points: bool,
    pub redemption_points_cost: u32,
    pub has_variations: bool,
    pub is_perishable: bool,
    pub is_packaging: bool,
    pub supplier_offer_id: Option<SupplierOfferId>,
}

impl ProductDraft {
    /// Turn caller input into a persistable record.
    ///
    /// Applied by both create and update; re-derives every coupled field
    /// instead of trusting the caller:
    /// - `earns_loyalty_points` follows `loyalty_points_value > 0`
    /// - `redemption_points_cost` is zeroed unless redemption is enabled
    /// - `price`/`stock_quantity` are zeroed when the product has variations
    pub fn normalize(
        self,
        id: ProductId,
        store_id: StoreId,
        created_at: DateTime<Utc>,
    ) -> CatalogResult<ProductRecord> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::validation("product name cannot be empty"));
        }
        if self.price.is_sign_negative() {
            return Err(CatalogError::validation("price cannot be negative"));
        }
        if self.cost_price.is_sign_negative() {
            return Err(CatalogError::validation("cost price cannot be negative"));
        }
        if self.loyalty_points_value.is_sign_negative() {
            return Err(CatalogError::validation(
                "loyalty points value cannot be negative",
            ));
        }

        let (price, stock_quantity) = if self.has_variations {
            (Decimal::ZERO, 0)
        } else {
            (self.price, self.stock_quantity)
        };

        let redemption_points_cost = if self.can_be_redeemed_with_points {
            self.redemption_points_cost
        } else {
            0
        };

        Ok(ProductRecord {
            id,
            store_id,
            name: self.name,
            price,
            cost_price: self.cost_price,
            stock_quantity,
            active: self.active,
            image_url: self.image_url.filter(|url| !url.trim().is_empty()),
            category_id: self.category_id,
            earns_loyalty_points: self.loyalty_points_value > Decimal::ZERO,
            loyalty_points_value: self.loyalty_points_value,
            can_be_redeemed_with_points: self.can_be_redeemed_with_points,
            redemption_points_cost,
            has_variations: self.has_variations,
            is_perishable: self.is_perishable,
            is_packaging: self.is_packaging,
            supplier_offer_id: self.supplier_offer_id,
            created_at,
        })
    }
}
