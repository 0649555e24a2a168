use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storecraft_core::{Entity, ProductId, StoreId, SupplierId, SupplierOfferId};

/// A supplier, store-scoped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub store_id: StoreId,
    pub corporate_name: String,
}

impl Entity for Supplier {
    type Id = SupplierId;

    fn id(&self) -> SupplierId {
        self.id
    }
}

/// An offer a supplier makes for one product, at an optional cost.
///
/// Consumed, not owned: offers are maintained elsewhere; the catalog only
/// binds a product to at most one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierOffer {
    pub id: SupplierOfferId,
    pub supplier_id: SupplierId,
    pub product_id: ProductId,
    pub cost_price: Option<Decimal>,
}

impl SupplierOffer {
    /// Cost to copy into a product at bind time.
    ///
    /// Binding snapshots the offer's cost; the reference is retained for
    /// re-derivation but the copied value does not track later offer edits.
    pub fn cost_snapshot(&self) -> Option<Decimal> {
        self.cost_price
    }
}

impl Entity for SupplierOffer {
    type Id = SupplierOfferId;

    fn id(&self) -> SupplierOfferId {
        self.id
    }
}

/// An offer joined with the referenced product's display name, as listed
/// for selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferView {
    pub offer: SupplierOffer,
    pub product_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn cost_snapshot_surfaces_the_offer_cost() {
        let offer = SupplierOffer {
            id: SupplierOfferId::new(),
            supplier_id: SupplierId::new(),
            product_id: ProductId::new(),
            cost_price: Some(dec!(7.35)),
        };
        assert_eq!(offer.cost_snapshot(), Some(dec!(7.35)));

        let costless = SupplierOffer {
            cost_price: None,
            ..offer
        };
        assert_eq!(costless.cost_snapshot(), None);
    }
}
