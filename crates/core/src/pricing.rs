//! Best-discount-wins price resolution.
//!
//! Every product carries a base price in whole forints and an optional list
//! of candidate discounts. Exactly one discount is ever applied: the one with
//! the largest absolute reduction. Discounts never stack.
//!
//! A discount that would drive the price below zero is a data-entry error in
//! the CMS, not a free product. The resolver flags the item as invalid and
//! reverts to the base price instead of flooring at zero.

use serde::{Deserialize, Serialize};

/// How a discount amount is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    /// `amount` is a percentage of the base price (0-100 expected).
    Percent,
    /// `amount` is a flat reduction in forints.
    Fixed,
}

/// A candidate discount attached to a catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    pub kind: DiscountKind,
    pub amount: i64,
}

impl Discount {
    /// Absolute reduction in forints this discount yields on `base_huf`.
    ///
    /// Percent reductions are rounded to the nearest forint.
    #[must_use]
    pub const fn reduction(&self, base_huf: i64) -> i64 {
        match self.kind {
            DiscountKind::Percent => (base_huf * self.amount + 50) / 100,
            DiscountKind::Fixed => self.amount,
        }
    }
}

/// The outcome of resolving a base price against its candidate discounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPrice {
    /// Price the customer pays, in forints.
    pub final_huf: i64,
    /// Original price, present only when a positive, valid discount applied.
    pub compare_at_huf: Option<i64>,
    /// True when the best discount would have driven the price negative.
    pub invalid: bool,
}

impl ResolvedPrice {
    const fn unchanged(base_huf: i64) -> Self {
        Self {
            final_huf: base_huf,
            compare_at_huf: None,
            invalid: false,
        }
    }
}

/// Resolve the final price for `base_huf` under best-discount-wins.
///
/// Non-positive reductions are discarded. Among the remaining candidates the
/// single largest reduction wins; ties resolve to the first encountered after
/// a stable descending sort. If the winning reduction exceeds the base price
/// the item is flagged invalid and the price reverts to base.
#[must_use]
pub fn resolve_price(base_huf: i64, discounts: &[Discount]) -> ResolvedPrice {
    let mut reductions: Vec<i64> = discounts
        .iter()
        .map(|d| d.reduction(base_huf))
        .filter(|&r| r > 0)
        .collect();
    reductions.sort_by(|a, b| b.cmp(a));

    let Some(&best) = reductions.first() else {
        return ResolvedPrice::unchanged(base_huf);
    };

    let final_huf = base_huf - best;
    if final_huf < 0 {
        return ResolvedPrice {
            final_huf: base_huf,
            compare_at_huf: None,
            invalid: true,
        };
    }

    ResolvedPrice {
        final_huf,
        compare_at_huf: Some(base_huf),
        invalid: false,
    }
}
