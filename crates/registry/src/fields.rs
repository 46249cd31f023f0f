//! Field keys understood by the registry itself.

use serde_json::Value;

use crate::extension::Extension;
use crate::field::FieldKey;

/// Default options of an extension (an object).
pub const OPTIONS: FieldKey<Value> = FieldKey::new("add_options");

/// Initial value of the extension's storage bag.
pub const STORAGE: FieldKey<Value> = FieldKey::new("add_storage");

/// Additional extensions expanded in place after this one.
pub const EXTENSIONS: FieldKey<Vec<Extension>> = FieldKey::new("add_extensions");
