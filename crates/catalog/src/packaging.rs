use serde::{Deserialize, Serialize};

use storecraft_core::{Entity, PackagingLinkId, ProductId, StoreId};

/// A packaging consumption rule: selling one unit of `product_id` consumes
/// `quantity` units of the packaging product `packaging_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagingLinkRecord {
    pub id: PackagingLinkId,
    pub store_id: StoreId,
    pub packaging_id: ProductId,
    pub product_id: ProductId,
    pub quantity: u32,
}

impl Entity for PackagingLinkRecord {
    type Id = PackagingLinkId;

    fn id(&self) -> PackagingLinkId {
        self.id
    }
}

/// One row of the link editor as submitted: the target may still be unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagingLinkDraft {
    pub product_id: Option<ProductId>,
    pub quantity: u32,
}

/// Drop incomplete rows from a link batch.
///
/// An entry with no target product or a non-positive quantity is silently
/// discarded rather than failing the whole packaging-product creation.
pub fn sanitize_links(drafts: Vec<PackagingLinkDraft>) -> Vec<(ProductId, u32)> {
    drafts
        .into_iter()
        .filter_map(|draft| match draft.product_id {
            Some(product_id) if draft.quantity >= 1 => Some((product_id, draft.quantity)),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_drops_incomplete_entries() {
        let p1 = ProductId::new();
        let batch = vec![
            PackagingLinkDraft {
                product_id: Some(p1),
                quantity: 2,
            },
            PackagingLinkDraft {
                product_id: None,
                quantity: 1,
            },
            PackagingLinkDraft {
                product_id: Some(ProductId::new()),
                quantity: 0,
            },
        ];

        let kept = sanitize_links(batch);
        assert_eq!(kept, vec![(p1, 2)]);
    }

    #[test]
    fn sanitize_keeps_complete_entries_in_order() {
        let p1 = ProductId::new();
        let p2 = ProductId::new();
        let batch = vec![
            PackagingLinkDraft {
                product_id: Some(p1),
                quantity: 1,
            },
            PackagingLinkDraft {
                product_id: Some(p2),
                quantity: 3,
            },
        ];

        assert_eq!(sanitize_links(batch), vec![(p1, 1), (p2, 3)]);
    }
}
