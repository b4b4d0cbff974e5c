//! Normalized views of a stored toy document.
//!
//! Documents are schemaless JSON objects; field types are not guaranteed by
//! the store. Everything here tolerates missing or oddly typed fields and
//! produces the shapes served over HTTP.

use serde::Serialize;
use serde_json::{Number, Value};
use uuid::Uuid;

use crate::slug::slug_or_derived;

/// Document field names.
pub mod fields {
    pub const NAME: &str = "name";
    pub const SLUG: &str = "slug";
    pub const PRICE: &str = "price";
    pub const DESCRIPTION: &str = "description";
    pub const IMAGES: &str = "images";
    pub const CATEGORY: &str = "category";
    pub const STOCK: &str = "stock";
    pub const POPULARITY: &str = "popularity";
    pub const CREATED: &str = "created";
    pub const CREATED_AT: &str = "createdAt";
}

/// One entry of a catalog listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToySummary {
    pub id: Uuid,
    pub name: String,
    pub price: Option<Number>,
    pub images: Vec<String>,
    pub category: Vec<String>,
    pub popularity: i64,
    /// Stored value as is; omitted when the document has none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<Value>,
    pub slug: String,
}

impl ToySummary {
    #[must_use]
    pub fn from_document(id: Uuid, doc: &Value) -> Self {
        let name = name_of(doc);
        Self {
            id,
            price: coerce_price(doc.get(fields::PRICE)),
            images: string_array(doc, fields::IMAGES),
            category: string_array(doc, fields::CATEGORY),
            popularity: popularity_of(doc),
            stock: doc.get(fields::STOCK).cloned(),
            slug: slug_or_derived(doc.get(fields::SLUG).and_then(Value::as_str), &name),
            name,
        }
    }
}

/// A single product as served by the item endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToyDetail {
    pub id: Uuid,
    pub name: String,
    pub price: Option<Number>,
    pub description: String,
    pub images: Vec<String>,
    pub category: Vec<String>,
    pub slug: String,
}

impl ToyDetail {
    #[must_use]
    pub fn from_document(id: Uuid, doc: &Value) -> Self {
        let name = name_of(doc);
        Self {
            id,
            price: coerce_price(doc.get(fields::PRICE)),
            description: doc
                .get(fields::DESCRIPTION)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            images: string_array(doc, fields::IMAGES),
            category: string_array(doc, fields::CATEGORY),
            slug: slug_or_derived(doc.get(fields::SLUG).and_then(Value::as_str), &name),
            name,
        }
    }
}

/// Coerce a raw `price` value to a number.
///
/// Numbers pass through untouched. Strings are trimmed and parsed, with the
/// empty string meaning zero. Booleans become 1 or 0 and JSON `null` becomes
/// 0. A missing value, an unparsable or non-finite string, or an array or
/// object yields `None`.
#[must_use]
pub fn coerce_price(raw: Option<&Value>) -> Option<Number> {
    match raw? {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Some(Number::from(0));
            }
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .and_then(number_from_f64)
        }
        Value::Bool(b) => Some(Number::from(u8::from(*b))),
        Value::Null => Some(Number::from(0)),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Coerced price as a float, for ordering.
#[must_use]
pub fn price_sort_value(doc: &Value) -> Option<f64> {
    coerce_price(doc.get(fields::PRICE)).and_then(|n| n.as_f64())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub(crate) fn number_from_f64(value: f64) -> Option<Number> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if value.fract() == 0.0 && value.abs() < MAX_EXACT {
        Some(Number::from(value as i64))
    } else {
        Number::from_f64(value)
    }
}

fn name_of(doc: &Value) -> String {
    doc.get(fields::NAME)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn string_array(doc: &Value, key: &str) -> Vec<String> {
    doc.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

#[allow(clippy::cast_possible_truncation)]
fn popularity_of(doc: &Value) -> i64 {
    match doc.get(fields::POPULARITY) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|v| i64::try_from(v).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().map(|v| v.trunc() as i64))
            .unwrap_or(0),
        _ => 0,
    }
}
