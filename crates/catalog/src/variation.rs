use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storecraft_core::{CatalogError, CatalogResult, Entity, ProductId, VariationId};

/// Raw-material source of a composite variation.
///
/// Modelled as a tagged union so the "both references set" state is
/// unrepresentable in the write API; the persisted row keeps the two
/// nullable columns (see [`VariationRecord`]).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawMaterial {
    Product(ProductId),
    Variation(VariationId),
}

/// Composite settings supplied on write: what gets consumed, and how many
/// variation units one raw-material unit produces.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeSpec {
    pub raw_material: RawMaterial,
    pub yield_quantity: u32,
}

/// A variation row as persisted.
///
/// A variation cannot outlive its product. For a composite variation the
/// stored `stock_quantity` is a cached last-known value only; available
/// stock is derived from the raw material (see `composition`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationRecord {
    pub id: VariationId,
    pub product_id: ProductId,
    pub name: String,
    pub price_adjustment: Decimal,
    pub stock_quantity: u32,
    pub is_composite: bool,
    pub raw_material_product_id: Option<ProductId>,
    pub raw_material_variation_id: Option<VariationId>,
    pub yield_quantity: u32,
}

impl VariationRecord {
    /// Reconstruct the raw-material union from the persisted columns.
    pub fn raw_material(&self) -> Option<RawMaterial> {
        if !self.is_composite {
            return None;
        }
        match (self.raw_material_product_id, self.raw_material_variation_id) {
            (Some(product_id), None) => Some(RawMaterial::Product(product_id)),
            (None, Some(variation_id)) => Some(RawMaterial::Variation(variation_id)),
            _ => None,
        }
    }
}

impl Entity for VariationRecord {
    type Id = VariationId;

    fn id(&self) -> VariationId {
        self.id
    }
}

/// Caller-supplied variation fields, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationDraft {
    pub name: String,
    pub price_adjustment: Decimal,
    pub stock_quantity: u32,
    pub composite: Option<CompositeSpec>,
}

impl VariationDraft {
    /// Turn caller input into a persistable record.
    ///
    /// Composite variations get their stock zeroed (it is not authoritative)
    /// and exactly one raw-material column set from the union; non-composite
    /// variations get both columns cleared and `yield_quantity` pinned to 1.
    pub fn normalize(self, id: VariationId, product_id: ProductId) -> CatalogResult<VariationRecord> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::validation("variation name cannot be empty"));
        }

        match self.composite {
            Some(spec) => {
                if spec.yield_quantity < 1 {
                    return Err(CatalogError::validation(
                        "yield quantity must be at least 1",
                    ));
                }
                let (raw_product, raw_variation) = match spec.raw_material {
                    RawMaterial::Product(p) => (Some(p), None),
                    RawMaterial::Variation(v) => (None, Some(v)),
                };
                Ok(VariationRecord {
                    id,
                    product_id,
                    name: self.name,
                    price_adjustment: self.price_adjustment,
                    stock_quantity: 0,
                    is_composite: true,
                    raw_material_product_id: raw_product,
                    raw_material_variation_id: raw_variation,
                    yield_quantity: spec.yield_quantity,
                })
            }
            None => Ok(VariationRecord {
                id,
                product_id,
                name: self.name,
                price_adjustment: self.price_adjustment,
                stock_quantity: self.stock_quantity,
                is_composite: false,
                raw_material_product_id: None,
                raw_material_variation_id: None,
                yield_quantity: 1,
            }),
        }
    }
}
