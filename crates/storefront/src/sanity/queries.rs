//! GROQ queries used by the [`SanityClient`](super::SanityClient).
//!
//! Projections rename CMS-internal shapes to the flattened camelCase fields
//! the document types in [`super::types`] expect.

/// Product projection shared by every product query.
pub const PRODUCT_PROJECTION: &str = r#"{
  _id,
  "slug": slug.current,
  name,
  brand,
  "priceHuf": price,
  discounts[]{ kind, amount },
  stock,
  "images": images[].asset->url,
  category,
  description,
  specs[]{ key, value }
}"#;

/// Order projection shared by every order query.
pub const ORDER_PROJECTION: &str = r#"{
  _id,
  orderNumber,
  status,
  email,
  customerName,
  phone,
  shippingAddress{ zip, city, street },
  lines[]{ slug, name, quantity, unitPriceHuf, upgrades[]{ label, deltaHuf } },
  shippingHuf,
  discountHuf,
  totalHuf,
  couponCode,
  paymentProvider,
  paymentId,
  createdAt
}"#;

#[must_use]
pub fn product_by_slug() -> String {
    format!(r#"*[_type == "product" && slug.current == $slug][0] {PRODUCT_PROJECTION}"#)
}

#[must_use]
pub fn all_products() -> String {
    format!(r#"*[_type == "product" && !(_id in path("drafts.**"))] | order(name asc) {PRODUCT_PROJECTION}"#)
}

/// Case-insensitive lookup of an active coupon by code.
#[must_use]
pub fn coupon_by_code() -> String {
    r#"*[_type == "coupon" && upper(code) == upper($code) && active == true][0]
       { code, "kind": type, value, active, "expiresAt": expiresAt }"#
        .to_string()
}

#[must_use]
pub fn order_by_id() -> String {
    format!(r#"*[_type == "order" && _id == $id][0] {ORDER_PROJECTION}"#)
}

#[must_use]
pub fn order_by_payment_id() -> String {
    format!(r#"*[_type == "order" && paymentId == $paymentId][0] {ORDER_PROJECTION}"#)
}

pub const USER_PROJECTION: &str = r#"{
  _id,
  email,
  name,
  passwordHash,
  resetTokenHash,
  resetTokenExpiresAt
}"#;

#[must_use]
pub fn user_by_email() -> String {
    format!(r#"*[_type == "user" && email == $email][0] {USER_PROJECTION}"#)
}

/// Lookup by reset token hash, enforcing the expiry in the query itself.
#[must_use]
pub fn user_by_reset_token() -> String {
    format!(
        r#"*[_type == "user" && resetTokenHash == $hash && resetTokenExpiresAt > $now][0] {USER_PROJECTION}"#
    )
}

pub const ADDRESS_PROJECTION: &str = r#"{ _id, label, zip, city, street, isDefault }"#;

#[must_use]
pub fn addresses_by_user() -> String {
    format!(r#"*[_type == "address" && user._ref == $userId] | order(_createdAt asc) {ADDRESS_PROJECTION}"#)
}

#[must_use]
pub fn address_by_id() -> String {
    format!(r#"*[_type == "address" && _id == $id && user._ref == $userId][0] {ADDRESS_PROJECTION}"#)
}
