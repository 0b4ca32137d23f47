//! Order status machine and stock deduction rules.
//!
//! Orders live in the CMS and are mutated by the payment providers'
//! confirmation paths. Status wire strings are the Hungarian values the
//! frontend and back office already use.

use serde::{Deserialize, Serialize};

use crate::cart::CartUpgrade;

/// Lifecycle status of an order.
///
/// The only transition the storefront performs is
/// `Megrendelve -> Fizetve` when a payment provider confirms success;
/// `Teljesitve` and `Torolve` are set by the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Placed, awaiting payment.
    #[serde(rename = "MEGRENDELVE")]
    Megrendelve,
    /// Paid.
    #[serde(rename = "FIZETVE")]
    Fizetve,
    /// Fulfilled.
    #[serde(rename = "TELJESITVE")]
    Teljesitve,
    /// Cancelled.
    #[serde(rename = "TOROLVE")]
    Torolve,
}

impl OrderStatus {
    #[must_use]
    pub const fn is_paid(self) -> bool {
        matches!(self, Self::Fizetve | Self::Teljesitve)
    }

    /// Wire string as stored in the CMS document.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Megrendelve => "MEGRENDELVE",
            Self::Fizetve => "FIZETVE",
            Self::Teljesitve => "TELJESITVE",
            Self::Torolve => "TOROLVE",
        }
    }
}

/// One ordered line as persisted on the order document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub slug: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price_huf: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrades: Option<Vec<CartUpgrade>>,
}

impl OrderLine {
    /// Line total including upgrade deltas.
    #[must_use]
    pub fn line_total_huf(&self) -> i64 {
        let upgrade_sum: i64 = self
            .upgrades
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|u| u.delta_huf)
            .sum();
        (self.unit_price_huf + upgrade_sum) * i64::from(self.quantity)
    }
}

/// Quantities to deduct from stock, one entry per distinct slug.
///
/// Lines referencing the same product are summed, so an order with two lines
/// for one slug deducts once with the combined quantity. Order of first
/// appearance is preserved.
#[must_use]
pub fn stock_deductions(lines: &[OrderLine]) -> Vec<(String, u32)> {
    let mut deductions: Vec<(String, u32)> = Vec::new();
    for line in lines {
        if let Some(entry) = deductions.iter_mut().find(|(slug, _)| *slug == line.slug) {
            entry.1 = entry.1.saturating_add(line.quantity);
        } else {
            deductions.push((line.slug.clone(), line.quantity));
        }
    }
    deductions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(slug: &str, quantity: u32) -> OrderLine {
        OrderLine {
            slug: slug.to_string(),
            name: slug.to_string(),
            quantity,
            unit_price_huf: 10_000,
            upgrades: None,
        }
    }

    #[test]
    fn deductions_sum_quantities_per_slug() {
        let lines = vec![line("a", 2), line("b", 1), line("a", 3)];
        assert_eq!(
            stock_deductions(&lines),
            vec![("a".to_string(), 5), ("b".to_string(), 1)]
        );
    }

    #[test]
    fn deductions_preserve_first_appearance_order() {
        let lines = vec![line("z", 1), line("a", 1)];
        let deductions = stock_deductions(&lines);
        let slugs: Vec<&str> = deductions.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(slugs, vec!["z", "a"]);
    }

    #[test]
    fn status_wire_strings_round_trip() {
        for status in [
            OrderStatus::Megrendelve,
            OrderStatus::Fizetve,
            OrderStatus::Teljesitve,
            OrderStatus::Torolve,
        ] {
            let json = serde_json::to_string(&status).expect("serialize");
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            let back: OrderStatus = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(back, status);
        }
    }

    #[test]
    fn paid_statuses() {
        assert!(!OrderStatus::Megrendelve.is_paid());
        assert!(OrderStatus::Fizetve.is_paid());
        assert!(OrderStatus::Teljesitve.is_paid());
        assert!(!OrderStatus::Torolve.is_paid());
    }

    #[test]
    fn line_total_counts_upgrades() {
        let mut l = line("a", 2);
        l.upgrades = Some(vec![CartUpgrade {
            label: "NVMe".to_string(),
            delta_huf: 5_000,
        }]);
        assert_eq!(l.line_total_huf(), 30_000);
    }
}
