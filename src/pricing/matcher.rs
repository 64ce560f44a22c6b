// Promotion selection for a product/unit pair
//
// Selection rules: a promotion pinned to the exact unit beats a product-wide
// one, and within the same specificity the most recently created promotion
// wins. At most one per-unit promotion applies to a line.

use crate::pricing::promotion_index::PromotionIndex;
use crate::promotions::Promotion;

/// Pick the applicable promotion for a unit of a product, if any
///
/// `unit_id` is `None` when the product is sold through its synthesized base
/// unit; only product-wide promotions can match in that case.
pub fn match_promotion<'a>(
    index: &'a PromotionIndex,
    product_id: i32,
    unit_id: Option<i32>,
) -> Option<&'a Promotion> {
    let mut best: Option<&Promotion> = None;

    for candidate in index.unit_promotions(product_id) {
        let applies = match candidate.unit_id {
            None => true,
            Some(pinned) => unit_id == Some(pinned),
        };
        if !applies {
            continue;
        }

        best = match best {
            None => Some(candidate),
            Some(current) => {
                if beats(candidate, current) {
                    Some(candidate)
                } else {
                    Some(current)
                }
            }
        };
    }

    best
}

fn beats(candidate: &Promotion, current: &Promotion) -> bool {
    let candidate_exact = candidate.unit_id.is_some();
    let current_exact = current.unit_id.is_some();

    if candidate_exact != current_exact {
        return candidate_exact;
    }
    candidate.created_at > current.created_at
}
