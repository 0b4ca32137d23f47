//! Cart line items, totals, and mutation rules.
//!
//! The cart is held entirely by the browser in the `cart-json` cookie; the
//! server never stores it. These types define the cookie's wire shape
//! (camelCase JSON) and the mutation semantics: add merges by slug, a
//! quantity of zero removes the line, and the total is always recomputed
//! from the lines rather than stored.
//!
//! Prices inside a cart are snapshots. The storefront re-resolves every line
//! against the live catalog on each read, so a stale snapshot is corrected
//! (or the line dropped) before anything is shown or charged.

use serde::{Deserialize, Serialize};

/// A configurable upgrade selected for a cart line (e.g. more RAM).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartUpgrade {
    pub label: String,
    pub delta_huf: i64,
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Catalog slug identifying the product.
    pub slug: String,
    pub name: String,
    pub brand: String,
    /// Unit price snapshot in forints, excluding upgrades.
    pub price_huf: i64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrades: Option<Vec<CartUpgrade>>,
}

impl CartItem {
    /// Unit price including all selected upgrade deltas.
    #[must_use]
    pub fn unit_total_huf(&self) -> i64 {
        let upgrade_sum: i64 = self
            .upgrades
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|u| u.delta_huf)
            .sum();
        self.price_huf + upgrade_sum
    }

    /// Line total: (unit price + upgrade deltas) x quantity.
    #[must_use]
    pub fn line_total_huf(&self) -> i64 {
        self.unit_total_huf() * i64::from(self.quantity)
    }
}

/// The whole cart as stored in the cookie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all line totals in forints.
    #[must_use]
    pub fn total_huf(&self) -> i64 {
        self.items.iter().map(CartItem::line_total_huf).sum()
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Add an item, merging with an existing line for the same slug.
    ///
    /// Merging sums quantities but takes the incoming price snapshot and
    /// upgrade selection, replacing whatever the old line carried.
    pub fn add(&mut self, item: CartItem) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.slug == item.slug) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
            existing.price_huf = item.price_huf;
            existing.name = item.name;
            existing.brand = item.brand;
            existing.image = item.image;
            existing.upgrades = item.upgrades;
        } else {
            self.items.push(item);
        }
    }

    /// Set the quantity of the line for `slug`; zero removes the line.
    ///
    /// Unknown slugs are ignored.
    pub fn set_quantity(&mut self, slug: &str, quantity: u32) {
        if quantity == 0 {
            self.remove(slug);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.slug == slug) {
            item.quantity = quantity;
        }
    }

    /// Remove the line for `slug`, if present.
    pub fn remove(&mut self, slug: &str) {
        self.items.retain(|i| i.slug != slug);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(slug: &str, price: i64, quantity: u32) -> CartItem {
        CartItem {
            slug: slug.to_string(),
            name: slug.to_uppercase(),
            brand: "Wellcomp".to_string(),
            price_huf: price,
            quantity,
            image: None,
            upgrades: None,
        }
    }

    #[test]
    fn total_includes_upgrade_deltas_per_unit() {
        let mut laptop = item("probook-450", 250_000, 2);
        laptop.upgrades = Some(vec![
            CartUpgrade {
                label: "16GB RAM".to_string(),
                delta_huf: 15_000,
            },
            CartUpgrade {
                label: "1TB SSD".to_string(),
                delta_huf: 25_000,
            },
        ]);
        let cart = Cart {
            items: vec![laptop, item("mouse-mx", 12_000, 1)],
        };
        // (250 000 + 40 000) * 2 + 12 000
        assert_eq!(cart.total_huf(), 592_000);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn add_merges_same_slug_into_one_line() {
        let mut cart = Cart::default();
        cart.add(item("probook-450", 250_000, 1));
        cart.add(item("probook-450", 240_000, 2));

        assert_eq!(cart.items.len(), 1);
        let line = &cart.items[0];
        assert_eq!(line.quantity, 3);
        // Second add wins the price snapshot.
        assert_eq!(line.price_huf, 240_000);
    }

    #[test]
    fn add_replaces_upgrade_selection_on_merge() {
        let mut cart = Cart::default();
        let mut first = item("probook-450", 250_000, 1);
        first.upgrades = Some(vec![CartUpgrade {
            label: "16GB RAM".to_string(),
            delta_huf: 15_000,
        }]);
        cart.add(first);

        let second = item("probook-450", 250_000, 1);
        cart.add(second);

        assert_eq!(cart.items[0].upgrades, None);
    }

    #[test]
    fn set_quantity_zero_removes_line() {
        let mut cart = Cart {
            items: vec![item("a", 100, 2), item("b", 200, 1)],
        };
        cart.set_quantity("a", 0);
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].slug, "b");
    }

    #[test]
    fn remove_filters_by_slug() {
        let mut cart = Cart {
            items: vec![item("a", 100, 2), item("b", 200, 1)],
        };
        cart.remove("b");
        assert_eq!(cart.items.len(), 1);
        cart.remove("missing");
        assert_eq!(cart.items.len(), 1);
    }

    #[test]
    fn cookie_wire_shape_is_camel_case() {
        let cart = Cart {
            items: vec![item("a", 1_000, 1)],
        };
        let json = serde_json::to_value(&cart).expect("serialize");
        let line = &json["items"][0];
        assert_eq!(line["priceHuf"], 1_000);
        assert!(line.get("price_huf").is_none());
        // Optional fields are omitted, not null.
        assert!(line.get("image").is_none());
    }
}
