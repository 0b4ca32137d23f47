//! Coupon redeemability and discount math.
//!
//! Coupons are documents in the CMS; validation never mutates them (no
//! redemption counter, no one-time-use enforcement). The computed discount
//! is clamped so it can never exceed the subtotal it applies to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a coupon's value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponKind {
    /// `value` is a percentage of the subtotal (floored to whole forints).
    Percent,
    /// `value` is a flat amount in forints.
    Amount,
}

/// A coupon as stored in the CMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub code: String,
    pub kind: CouponKind,
    pub value: i64,
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Coupon {
    /// Whether the coupon can be applied at `now`.
    #[must_use]
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expires_at.is_none_or(|exp| exp > now)
    }

    /// Discount in forints for `subtotal_huf`.
    ///
    /// Percent values floor to whole forints. The result is clamped to the
    /// subtotal and never negative, regardless of the stored value.
    #[must_use]
    pub const fn discount_for(&self, subtotal_huf: i64) -> i64 {
        let raw = match self.kind {
            CouponKind::Percent => subtotal_huf * self.value / 100,
            CouponKind::Amount => self.value,
        };
        if raw < 0 {
            0
        } else if raw > subtotal_huf {
            subtotal_huf
        } else {
            raw
        }
    }
}
