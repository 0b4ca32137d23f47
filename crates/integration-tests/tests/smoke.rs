//! In-process smoke tests. These run without a server and check that the
//! bundled data and shipped content files are usable as deployed.

use std::path::Path;

use wellcomp_core::{Discount, DiscountKind, resolve_price};
use wellcomp_storefront::content::ContentStore;
use wellcomp_storefront::zip::ZipCodeTable;

#[test]
fn bundled_zip_table_covers_the_capital() {
    let table = ZipCodeTable::bundled();
    assert!(!table.is_empty());
    assert_eq!(table.lookup("1011"), Some("Budapest"));
    assert_eq!(table.lookup("0000"), None);
}

#[test]
fn shipped_content_pages_load_and_render() {
    let content_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../storefront/content");
    let store = ContentStore::load(&content_dir).expect("content directory loads");

    // The legally required pages ship with the binary
    for slug in ["aszf", "adatvedelem", "szallitas", "garancia"] {
        let page = store
            .get_page(slug)
            .unwrap_or_else(|| panic!("missing page: {slug}"));
        assert!(!page.meta.title.is_empty());
        assert!(page.content_html.contains('<'));
    }
}

#[test]
fn discount_resolution_matches_the_displayed_price() {
    let resolved = resolve_price(
        250_000,
        &[
            Discount {
                kind: DiscountKind::Percent,
                amount: 10,
            },
            Discount {
                kind: DiscountKind::Fixed,
                amount: 20_000,
            },
        ],
    );
    // Best single discount wins, they never stack
    assert_eq!(resolved.final_huf, 225_000);
}
