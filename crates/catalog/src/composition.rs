//! Stock/price authority resolution and raw-material graph integrity.
//!
//! The composition rules decide, for any product/variation pair, where the
//! sellable price and stock actually live: on the product, on the variation,
//! or derived transitively through a chain of composite raw materials. The
//! same module guards the raw-material graph: every write that introduces or
//! changes an edge runs [`ensure_acyclic`] first, so read paths only ever
//! walk well-formed chains.

use std::collections::HashSet;

use rust_decimal::Decimal;

use storecraft_core::{CatalogError, CatalogResult, ProductId, VariationId};

use crate::product::ProductRecord;
use crate::variation::{RawMaterial, VariationRecord};

/// Read access to the catalog graph of one store.
///
/// Implementations are snapshots: a prefetched map in the service layer, or
/// plain `HashMap`s in tests.
pub trait CompositionView {
    fn product(&self, id: ProductId) -> Option<&ProductRecord>;
    fn variation(&self, id: VariationId) -> Option<&VariationRecord>;
}

/// The effective, sellable state of a product/variation pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listing {
    pub price: Decimal,
    pub stock: u64,
}

/// Effective sale price for a product or one of its variations.
///
/// A negative `price_adjustment` may not drive the result below zero; the
/// result is clamped to zero rather than rejected.
pub fn effective_price(product: &ProductRecord, variation: Option<&VariationRecord>) -> Decimal {
    match variation {
        None => product.price,
        Some(v) => {
            let adjusted = product.price + v.price_adjustment;
            if adjusted.is_sign_negative() {
                Decimal::ZERO
            } else {
                adjusted
            }
        }
    }
}

/// Effective available stock for a product or one of its variations.
///
/// For a composite variation this is the ceiling obtainable if the raw
/// material were fully converted: the raw material's own effective stock
/// times the yields along the chain. The cached `stock_quantity` of a
/// composite is never consulted.
pub fn effective_stock(
    view: &impl CompositionView,
    product: &ProductRecord,
    variation: Option<&VariationRecord>,
) -> CatalogResult<u64> {
    match variation {
        None => Ok(u64::from(product.stock_quantity)),
        Some(v) => variation_stock(view, v),
    }
}

/// Resolve both authorities at once.
pub fn resolve_listing(
    view: &impl CompositionView,
    product: &ProductRecord,
    variation: Option<&VariationRecord>,
) -> CatalogResult<Listing> {
    Ok(Listing {
        price: effective_price(product, variation),
        stock: effective_stock(view, product, variation)?,
    })
}

fn variation_stock(view: &impl CompositionView, start: &VariationRecord) -> CatalogResult<u64> {
    let mut seen: HashSet<VariationId> = HashSet::new();
    let mut multiplier: u64 = 1;
    let mut cursor = start;

    loop {
        if !seen.insert(cursor.id) {
            return Err(CatalogError::cycle(format!(
                "raw-material chain revisits variation {}",
                cursor.id
            )));
        }

        match cursor.raw_material() {
            None => return Ok(u64::from(cursor.stock_quantity).saturating_mul(multiplier)),
            Some(RawMaterial::Product(product_id)) => {
                let raw = view.product(product_id).ok_or_else(|| {
                    CatalogError::reference(format!("raw-material product {product_id} not found"))
                })?;
                return Ok(u64::from(raw.stock_quantity)
                    .saturating_mul(multiplier)
                    .saturating_mul(u64::from(cursor.yield_quantity)));
            }
            Some(RawMaterial::Variation(variation_id)) => {
                multiplier = multiplier.saturating_mul(u64::from(cursor.yield_quantity));
                cursor = view.variation(variation_id).ok_or_else(|| {
                    CatalogError::reference(format!(
                        "raw-material variation {variation_id} not found"
                    ))
                })?;
            }
        }
    }
}

/// Verify that binding `raw` as the raw material of `candidate` keeps the
/// raw-material graph acyclic.
///
/// Runs before any write that introduces or changes an edge. The walk
/// follows `raw_material_variation_id` references only (a product source is
/// terminal) with a visited set; reaching the candidate or any already-seen
/// node fails with a cycle error, a dangling link fails with a reference
/// error.
pub fn ensure_acyclic(
    view: &impl CompositionView,
    candidate: VariationId,
    raw: &RawMaterial,
) -> CatalogResult<()> {
    let mut cursor = match raw {
        RawMaterial::Product(_) => return Ok(()),
        RawMaterial::Variation(v) if *v == candidate => {
            return Err(CatalogError::cycle(
                "a variation cannot be its own raw material",
            ));
        }
        RawMaterial::Variation(v) => Some(*v),
    };

    let mut seen: HashSet<VariationId> = HashSet::new();
    seen.insert(candidate);

    while let Some(variation_id) = cursor {
        if !seen.insert(variation_id) {
            return Err(CatalogError::cycle(format!(
                "raw-material chain loops back through variation {variation_id}"
            )));
        }
        let record = view.variation(variation_id).ok_or_else(|| {
            CatalogError::reference(format!("raw-material variation {variation_id} not found"))
        })?;
        cursor = match record.raw_material() {
            Some(RawMaterial::Variation(next)) => Some(next),
            _ => None,
        };
    }

    Ok(())
}

/// Raw-material units consumed by selling `units_sold` units of a composite
/// variation with the given yield: `ceil(N / Y)`.
///
/// Cancellation restores exactly the same amount. This is the contract the
/// external sale engine follows; the model only records the relationship.
pub fn raw_material_units(units_sold: u32, yield_quantity: u32) -> u32 {
    units_sold.div_ceil(yield_quantity)
}
