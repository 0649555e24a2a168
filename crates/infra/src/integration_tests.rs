//! Integration tests for the full catalog surface.
//!
//! Services → in-memory store, with a recording sink capturing what the
//! operator would see.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use storecraft_catalog::{
    CompositeSpec, PackagingLinkDraft, ProductDraft, RawMaterial, VariationDraft,
};
use storecraft_core::{
    CatalogError, OrderLineId, StoreId, SupplierId, SupplierOfferId, VariationId,
};
use storecraft_suppliers::{Supplier, SupplierOffer};

use crate::cascade::DeletionState;
use crate::notify::{RecordingSink, Severity};
use crate::services::{CatalogService, CategoryService, SupplierOfferService};
use crate::store::{CatalogStore, InMemoryCatalogStore, OrderLineRef};

struct Harness {
    store: Arc<InMemoryCatalogStore>,
    sink: Arc<RecordingSink>,
    catalog: CatalogService<InMemoryCatalogStore, RecordingSink>,
    categories: CategoryService<InMemoryCatalogStore, RecordingSink>,
    offers: SupplierOfferService<InMemoryCatalogStore, RecordingSink>,
    store_id: StoreId,
}

fn harness() -> Harness {
    storecraft_observability::init();
    let store = Arc::new(InMemoryCatalogStore::new());
    let sink = Arc::new(RecordingSink::new());
    Harness {
        catalog: CatalogService::new(store.clone(), sink.clone()),
        categories: CategoryService::new(store.clone(), sink.clone()),
        offers: SupplierOfferService::new(store.clone(), sink.clone()),
        store,
        sink,
        store_id: StoreId::new(),
    }
}

fn product_draft(name: &str) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        price: dec!(25.90),
        cost_price: dec!(10.00),
        stock_quantity: 8,
        active: true,
        image_url: None,
        category_id: None,
        loyalty_points_value: Decimal::ZERO,
        can_be_redeemed_with_points: false,
        redemption_points_cost: 0,
        has_variations: false,
        is_perishable: false,
        is_packaging: false,
        supplier_offer_id: None,
    }
}

fn grouping_draft(name: &str) -> ProductDraft {
    ProductDraft {
        has_variations: true,
        ..product_draft(name)
    }
}

fn plain_variation(name: &str, stock: u32) -> VariationDraft {
    VariationDraft {
        name: name.to_string(),
        price_adjustment: dec!(0.00),
        stock_quantity: stock,
        composite: None,
    }
}

fn composite_variation(name: &str, raw: RawMaterial, yield_quantity: u32) -> VariationDraft {
    VariationDraft {
        name: name.to_string(),
        price_adjustment: dec!(0.00),
        stock_quantity: 0,
        composite: Some(CompositeSpec {
            raw_material: raw,
            yield_quantity,
        }),
    }
}

#[tokio::test]
async fn grouping_product_is_stored_with_zero_price_and_stock() {
    let h = harness();
    let record = h
        .catalog
        .create_product(h.store_id, grouping_draft("Stuffed Chicken"), vec![])
        .await
        .unwrap();

    assert_eq!(record.price, Decimal::ZERO);
    assert_eq!(record.stock_quantity, 0);

    let stored = h.catalog.get_product(h.store_id, record.id).await.unwrap();
    assert_eq!(stored.price, Decimal::ZERO);
    assert_eq!(stored.stock_quantity, 0);
}

#[tokio::test]
async fn update_forces_redemption_cost_to_zero_when_disabled() {
    let h = harness();
    let mut draft = product_draft("Espresso");
    draft.can_be_redeemed_with_points = true;
    draft.redemption_points_cost = 150;
    let record = h
        .catalog
        .create_product(h.store_id, draft, vec![])
        .await
        .unwrap();
    assert_eq!(record.redemption_points_cost, 150);

    let mut draft = product_draft("Espresso");
    draft.can_be_redeemed_with_points = false;
    draft.redemption_points_cost = 150;
    let updated = h
        .catalog
        .update_product(h.store_id, record.id, draft)
        .await
        .unwrap();
    assert_eq!(updated.redemption_points_cost, 0);
}

#[tokio::test]
async fn cascading_delete_removes_dependents_before_the_product() {
    let h = harness();
    let product = h
        .catalog
        .create_product(h.store_id, grouping_draft("Stuffed Chicken"), vec![])
        .await
        .unwrap();

    for name in ["Small", "Medium", "Large"] {
        h.catalog
            .add_variation(h.store_id, product.id, plain_variation(name, 5))
            .await
            .unwrap();
    }
    for _ in 0..2 {
        h.store
            .insert_order_line(OrderLineRef {
                id: OrderLineId::new(),
                store_id: h.store_id,
                product_id: product.id,
            })
            .await
            .unwrap();
    }

    let report = h
        .catalog
        .delete_product(h.store_id, product.id, true)
        .await
        .unwrap();

    assert_eq!(report.state, DeletionState::Committed);
    assert_eq!(report.removed_variations, 3);
    assert_eq!(report.removed_order_lines, 2);

    assert!(h.store.list_variations(product.id).await.unwrap().is_empty());
    assert!(
        h.store
            .list_order_lines_for(h.store_id, product.id)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        h.store
            .fetch_product(h.store_id, product.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn unconfirmed_delete_stops_at_requested_and_removes_nothing() {
    let h = harness();
    let product = h
        .catalog
        .create_product(h.store_id, product_draft("Espresso"), vec![])
        .await
        .unwrap();

    let report = h
        .catalog
        .delete_product(h.store_id, product.id, false)
        .await
        .unwrap();

    assert_eq!(report.state, DeletionState::Requested);
    assert!(
        h.store
            .fetch_product(h.store_id, product.id)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn packaging_batch_insert_drops_malformed_entries() {
    let h = harness();
    let target = h
        .catalog
        .create_product(h.store_id, product_draft("Espresso"), vec![])
        .await
        .unwrap();

    let mut box_draft = product_draft("Takeaway Box");
    box_draft.is_packaging = true;
    let links = vec![
        PackagingLinkDraft {
            product_id: Some(target.id),
            quantity: 2,
        },
        PackagingLinkDraft {
            product_id: None,
            quantity: 1,
        },
    ];
    let packaging = h
        .catalog
        .create_product(h.store_id, box_draft, links)
        .await
        .unwrap();

    let persisted = h
        .catalog
        .packaging_links(h.store_id, packaging.id)
        .await
        .unwrap();
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].product_id, target.id);
    assert_eq!(persisted[0].quantity, 2);
}

#[tokio::test]
async fn packaging_links_may_not_target_variation_groups() {
    let h = harness();
    let group = h
        .catalog
        .create_product(h.store_id, grouping_draft("Stuffed Chicken"), vec![])
        .await
        .unwrap();

    let mut box_draft = product_draft("Takeaway Box");
    box_draft.is_packaging = true;
    let err = h
        .catalog
        .create_product(
            h.store_id,
            box_draft,
            vec![PackagingLinkDraft {
                product_id: Some(group.id),
                quantity: 1,
            }],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Validation(_)));
}

#[tokio::test]
async fn category_deletion_does_not_cascade_to_products() {
    let h = harness();
    let category = h.categories.create(h.store_id, "Drinks").await.unwrap();

    let mut ids = Vec::new();
    for i in 0..5 {
        let mut draft = product_draft(&format!("Drink {i}"));
        draft.category_id = Some(category.id);
        ids.push(
            h.catalog
                .create_product(h.store_id, draft, vec![])
                .await
                .unwrap()
                .id,
        );
    }

    h.categories.delete(h.store_id, category.id).await.unwrap();

    for id in ids {
        let product = h.catalog.get_product(h.store_id, id).await.unwrap();
        assert_eq!(product.category_id, Some(category.id));
        let label = h
            .categories
            .display_name_for(h.store_id, product.category_id)
            .await
            .unwrap();
        assert_eq!(label, "Uncategorized");
    }
}

#[tokio::test]
async fn two_variation_cycle_fails_the_second_write() {
    let h = harness();
    let owner = h
        .catalog
        .create_product(h.store_id, grouping_draft("Stuffed Chicken"), vec![])
        .await
        .unwrap();

    let b = h
        .catalog
        .add_variation(h.store_id, owner.id, plain_variation("Whole", 4))
        .await
        .unwrap();
    let a = h
        .catalog
        .add_variation(
            h.store_id,
            owner.id,
            composite_variation("Half", RawMaterial::Variation(b.id), 2),
        )
        .await
        .unwrap();

    let err = h
        .catalog
        .update_variation(
            h.store_id,
            b.id,
            composite_variation("Whole", RawMaterial::Variation(a.id), 1),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Cycle(_)));
}

#[tokio::test]
async fn three_variation_cycle_is_rejected() {
    let h = harness();
    let owner = h
        .catalog
        .create_product(h.store_id, grouping_draft("Cake"), vec![])
        .await
        .unwrap();

    let a = h
        .catalog
        .add_variation(h.store_id, owner.id, plain_variation("Whole Cake", 3))
        .await
        .unwrap();
    let b = h
        .catalog
        .add_variation(
            h.store_id,
            owner.id,
            composite_variation("Half Cake", RawMaterial::Variation(a.id), 2),
        )
        .await
        .unwrap();
    let c = h
        .catalog
        .add_variation(
            h.store_id,
            owner.id,
            composite_variation("Slice", RawMaterial::Variation(b.id), 4),
        )
        .await
        .unwrap();

    let err = h
        .catalog
        .update_variation(
            h.store_id,
            a.id,
            composite_variation("Whole Cake", RawMaterial::Variation(c.id), 1),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Cycle(_)));
}

#[tokio::test]
async fn variation_cannot_name_itself_as_raw_material() {
    let h = harness();
    let owner = h
        .catalog
        .create_product(h.store_id, grouping_draft("Cake"), vec![])
        .await
        .unwrap();
    let v = h
        .catalog
        .add_variation(h.store_id, owner.id, plain_variation("Slice", 10))
        .await
        .unwrap();

    let err = h
        .catalog
        .update_variation(
            h.store_id,
            v.id,
            composite_variation("Slice", RawMaterial::Variation(v.id), 2),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Cycle(_)));
}

#[tokio::test]
async fn raw_material_outside_the_store_is_rejected() {
    let h = harness();
    let owner = h
        .catalog
        .create_product(h.store_id, grouping_draft("Cake"), vec![])
        .await
        .unwrap();

    let foreign_store = StoreId::new();
    let foreign = h
        .catalog
        .create_product(foreign_store, product_draft("Foreign Flour"), vec![])
        .await
        .unwrap();

    let err = h
        .catalog
        .add_variation(
            h.store_id,
            owner.id,
            composite_variation("Slice", RawMaterial::Product(foreign.id), 2),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Reference(_)));

    let err = h
        .catalog
        .add_variation(
            h.store_id,
            owner.id,
            composite_variation("Slice", RawMaterial::Variation(VariationId::new()), 2),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Reference(_)));
}

#[tokio::test]
async fn deleting_a_referenced_variation_is_refused() {
    let h = harness();
    let owner = h
        .catalog
        .create_product(h.store_id, grouping_draft("Stuffed Chicken"), vec![])
        .await
        .unwrap();

    let whole = h
        .catalog
        .add_variation(h.store_id, owner.id, plain_variation("Whole", 4))
        .await
        .unwrap();
    h.catalog
        .add_variation(
            h.store_id,
            owner.id,
            composite_variation("Half", RawMaterial::Variation(whole.id), 2),
        )
        .await
        .unwrap();

    let err = h
        .catalog
        .delete_variation(h.store_id, whole.id)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Precondition(_)));
}

#[tokio::test]
async fn product_referenced_as_raw_material_cannot_be_cascade_deleted() {
    let h = harness();
    let raw = h
        .catalog
        .create_product(h.store_id, product_draft("Roast Chicken"), vec![])
        .await
        .unwrap();
    let owner = h
        .catalog
        .create_product(h.store_id, grouping_draft("Half Portions"), vec![])
        .await
        .unwrap();
    h.catalog
        .add_variation(
            h.store_id,
            owner.id,
            composite_variation("Half", RawMaterial::Product(raw.id), 2),
        )
        .await
        .unwrap();

    let err = h
        .catalog
        .delete_product(h.store_id, raw.id, true)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Precondition(_)));
}

#[tokio::test]
async fn composite_listing_derives_stock_from_the_raw_material() {
    let h = harness();
    let raw = h
        .catalog
        .create_product(h.store_id, product_draft("Roast Chicken"), vec![])
        .await
        .unwrap();
    assert_eq!(raw.stock_quantity, 8);

    let owner = h
        .catalog
        .create_product(h.store_id, grouping_draft("Half Portions"), vec![])
        .await
        .unwrap();
    let mut draft = composite_variation("Half", RawMaterial::Product(raw.id), 2);
    draft.price_adjustment = dec!(12.00);
    let half = h
        .catalog
        .add_variation(h.store_id, owner.id, draft)
        .await
        .unwrap();

    let listing = h
        .catalog
        .resolve_listing(h.store_id, owner.id, Some(half.id))
        .await
        .unwrap();

    // 8 whole chickens at yield 2; the grouping product's price is 0.
    assert_eq!(listing.stock, 16);
    assert_eq!(listing.price, dec!(12.00));
    // The cached column is not what the read path used.
    assert_eq!(half.stock_quantity, 0);
}

#[tokio::test]
async fn negative_adjustment_is_clamped_at_listing_time() {
    let h = harness();
    let product = h
        .catalog
        .create_product(h.store_id, product_draft("Espresso"), vec![])
        .await
        .unwrap();

    let mut draft = plain_variation("Promo", 3);
    draft.price_adjustment = dec!(-99.00);
    let promo = h
        .catalog
        .add_variation(h.store_id, product.id, draft)
        .await
        .unwrap();

    let listing = h
        .catalog
        .resolve_listing(h.store_id, product.id, Some(promo.id))
        .await
        .unwrap();
    assert_eq!(listing.price, Decimal::ZERO);
}

#[tokio::test]
async fn binding_an_offer_snapshots_its_cost() {
    let h = harness();
    let product = h
        .catalog
        .create_product(h.store_id, product_draft("Espresso"), vec![])
        .await
        .unwrap();

    let supplier = Supplier {
        id: SupplierId::new(),
        store_id: h.store_id,
        corporate_name: "Beans & Co".to_string(),
    };
    let offer = SupplierOffer {
        id: SupplierOfferId::new(),
        supplier_id: supplier.id,
        product_id: product.id,
        cost_price: Some(dec!(7.35)),
    };
    h.store.insert_supplier(supplier.clone()).await.unwrap();
    h.store.insert_offer(offer.clone()).await.unwrap();

    let views = h
        .offers
        .list_offers(h.store_id, supplier.id)
        .await
        .unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].product_name, "Espresso");

    let cost = h
        .offers
        .bind(h.store_id, product.id, Some(offer.id))
        .await
        .unwrap();
    assert_eq!(cost, Some(dec!(7.35)));

    let bound = h.catalog.get_product(h.store_id, product.id).await.unwrap();
    assert_eq!(bound.supplier_offer_id, Some(offer.id));
    assert_eq!(bound.cost_price, dec!(7.35));

    // Unbinding clears the reference but keeps the snapshotted cost.
    let cost = h.offers.bind(h.store_id, product.id, None).await.unwrap();
    assert_eq!(cost, None);
    let unbound = h.catalog.get_product(h.store_id, product.id).await.unwrap();
    assert_eq!(unbound.supplier_offer_id, None);
    assert_eq!(unbound.cost_price, dec!(7.35));
}

#[tokio::test]
async fn binding_an_unknown_offer_does_not_fail() {
    let h = harness();
    let product = h
        .catalog
        .create_product(h.store_id, product_draft("Espresso"), vec![])
        .await
        .unwrap();

    let ghost = SupplierOfferId::new();
    let cost = h
        .offers
        .bind(h.store_id, product.id, Some(ghost))
        .await
        .unwrap();
    assert_eq!(cost, None);

    let bound = h.catalog.get_product(h.store_id, product.id).await.unwrap();
    assert_eq!(bound.supplier_offer_id, Some(ghost));
    assert_eq!(bound.cost_price, dec!(10.00));
}

#[tokio::test]
async fn labelled_variation_listing_orders_by_product_name() {
    let h = harness();
    let zebra = h
        .catalog
        .create_product(h.store_id, grouping_draft("Zebra Cake"), vec![])
        .await
        .unwrap();
    let apple = h
        .catalog
        .create_product(h.store_id, grouping_draft("Apple Pie"), vec![])
        .await
        .unwrap();

    h.catalog
        .add_variation(h.store_id, zebra.id, plain_variation("Slice", 1))
        .await
        .unwrap();
    h.catalog
        .add_variation(h.store_id, apple.id, plain_variation("Slice", 1))
        .await
        .unwrap();

    let rows = h.catalog.list_all_variations(h.store_id).await.unwrap();
    let labels: Vec<_> = rows.iter().map(|r| r.product_name.as_str()).collect();
    assert_eq!(labels, vec!["Apple Pie", "Zebra Cake"]);
}

#[tokio::test]
async fn outcomes_reach_the_notification_sink() {
    let h = harness();
    h.catalog
        .create_product(h.store_id, product_draft("Espresso"), vec![])
        .await
        .unwrap();
    let err = h
        .catalog
        .create_product(h.store_id, product_draft("   "), vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Validation(_)));

    let sent = h.sink.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].severity, Severity::Info);
    assert_eq!(sent[0].title, "Product added");
    assert_eq!(sent[1].severity, Severity::Error);
    assert_eq!(sent[1].title, "Failed to add product");
}
