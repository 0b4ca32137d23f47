//! Shared newtype wrappers.

mod email;
mod id;

pub use email::{Email, EmailError};

use crate::define_id;

define_id!(OrderId);
define_id!(UserId);
define_id!(ProductId);
