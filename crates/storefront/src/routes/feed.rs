//! Árukereső product feed.
//!
//! The price comparison site fetches `/feed/arukereso.xml` periodically.
//! The XML is assembled by hand - the shape is flat and fixed, and the only
//! subtlety is escaping, which gets its own function and tests.

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};
use tracing::instrument;

use crate::error::Result;
use crate::sanity::types::ProductDoc;
use crate::state::AppState;

/// `GET /feed/arukereso.xml` - the full catalog as an Árukereső feed.
#[instrument(skip(state))]
pub async fn arukereso(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let products = state.sanity().list_products().await?;
    let xml = render_feed(&products, &state.config().frontend_url);

    Ok((
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        xml,
    ))
}

fn render_feed(products: &[ProductDoc], frontend_url: &str) -> String {
    let mut xml = String::with_capacity(products.len() * 512);
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<products>\n");

    for product in products {
        let resolved = product.resolved_price();
        xml.push_str("  <product>\n");
        push_field(&mut xml, "identifier", &product.slug);
        push_field(&mut xml, "manufacturer", &product.brand);
        push_field(&mut xml, "name", &product.name);
        push_field(
            &mut xml,
            "product_url",
            &format!("{frontend_url}/termek/{}", product.slug),
        );
        push_field(&mut xml, "price", &resolved.final_huf.to_string());
        if let Some(category) = &product.category {
            push_field(&mut xml, "category", category);
        }
        if let Some(image) = product.first_image() {
            push_field(&mut xml, "image_url", image);
        }
        push_field(
            &mut xml,
            "delivery_time",
            if product.stock > 0 { "2" } else { "10" },
        );
        for spec in &product.specs {
            xml.push_str("    <param>\n");
            push_indented_field(&mut xml, "name", &spec.key);
            push_indented_field(&mut xml, "value", &spec.value);
            xml.push_str("    </param>\n");
        }
        xml.push_str("  </product>\n");
    }

    xml.push_str("</products>\n");
    xml
}

fn push_field(xml: &mut String, tag: &str, value: &str) {
    xml.push_str("    <");
    xml.push_str(tag);
    xml.push('>');
    xml.push_str(&escape_xml(value));
    xml.push_str("</");
    xml.push_str(tag);
    xml.push_str(">\n");
}

fn push_indented_field(xml: &mut String, tag: &str, value: &str) {
    xml.push_str("  ");
    push_field(xml, tag, value);
}

/// Escape the five XML-significant characters.
fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use wellcomp_core::{Discount, DiscountKind};

    fn product(slug: &str, name: &str) -> ProductDoc {
        ProductDoc {
            id: format!("product-{slug}"),
            slug: slug.to_string(),
            name: name.to_string(),
            brand: "HP".to_string(),
            price_huf: 250_000,
            discounts: vec![],
            stock: 3,
            images: vec!["https://cdn.example.com/a.jpg".to_string()],
            category: Some("Laptop".to_string()),
            description: None,
            specs: vec![],
        }
    }

    #[test]
    fn escapes_all_significant_characters() {
        assert_eq!(
            escape_xml(r#"<Dell & HP> "15,6"-os 'laptop'"#),
            "&lt;Dell &amp; HP&gt; &quot;15,6&quot;-os &apos;laptop&apos;"
        );
        assert_eq!(escape_xml("sima szöveg"), "sima szöveg");
    }

    #[test]
    fn feed_carries_resolved_price() {
        let mut p = product("probook-450", "HP ProBook 450");
        p.discounts = vec![Discount {
            kind: DiscountKind::Percent,
            amount: 10,
        }];
        let xml = render_feed(&[p], "https://wellcomp.hu");
        // 250 000 minus 10 percent
        assert!(xml.contains("<price>225000</price>"));
        assert!(xml.contains("<product_url>https://wellcomp.hu/termek/probook-450</product_url>"));
    }

    #[test]
    fn feed_escapes_product_fields() {
        let p = product("kabel", "USB-C kábel <2m> & töltő");
        let xml = render_feed(&[p], "https://wellcomp.hu");
        assert!(xml.contains("USB-C kábel &lt;2m&gt; &amp; töltő"));
        assert!(!xml.contains("<2m>"));
    }

    #[test]
    fn empty_catalog_is_a_valid_document() {
        let xml = render_feed(&[], "https://wellcomp.hu");
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<products>"));
        assert!(xml.contains("</products>"));
    }
}
