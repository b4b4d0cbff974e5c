//! Catalog listing parameters and their ordering rules.

use std::cmp::Ordering;

use serde_json::Value;
use uuid::Uuid;

use crate::toys::{fields, price_sort_value};

/// Maximum number of products a listing returns.
pub const CATALOG_LIMIT: usize = 100;

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    PriceLow,
    PriceHigh,
    Newest,
    #[default]
    Popularity,
}

impl SortMode {
    /// Parse a `sort` query value; absent or unrecognized values fall back to
    /// [`SortMode::Popularity`].
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("price-low") => SortMode::PriceLow,
            Some("price-high") => SortMode::PriceHigh,
            Some("newest") => SortMode::Newest,
            _ => SortMode::Popularity,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::PriceLow => "price-low",
            SortMode::PriceHigh => "price-high",
            SortMode::Newest => "newest",
            SortMode::Popularity => "popularity",
        }
    }

    /// Total order over `(id, document)` pairs for this mode.
    ///
    /// Mirrors the SQL `ORDER BY` used by the Postgres store so both backends
    /// list products identically. Every mode finishes with `id DESC`.
    #[must_use]
    pub fn compare(self, a: (Uuid, &Value), b: (Uuid, &Value)) -> Ordering {
        let (a_id, a_doc) = a;
        let (b_id, b_doc) = b;

        let primary = match self {
            SortMode::PriceLow => {
                nulls_first_asc(price_sort_value(a_doc), price_sort_value(b_doc), f64::total_cmp)
            }
            SortMode::PriceHigh => {
                nulls_last_desc(price_sort_value(a_doc), price_sort_value(b_doc), f64::total_cmp)
            }
            SortMode::Newest => {
                field_desc(a_doc, b_doc, fields::CREATED)
                    .then_with(|| field_desc(a_doc, b_doc, fields::CREATED_AT))
            }
            SortMode::Popularity => field_desc(a_doc, b_doc, fields::POPULARITY),
        };

        primary.then_with(|| b_id.cmp(&a_id))
    }
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved listing request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogQuery {
    /// `None` lists every category.
    pub category: Option<String>,
    pub sort: SortMode,
}

impl CatalogQuery {
    /// Build a query from raw request parameters. An absent, empty or `"All"`
    /// category disables filtering.
    #[must_use]
    pub fn from_params(category: Option<&str>, sort: Option<&str>) -> Self {
        let category = category
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)
            .map(ToOwned::to_owned);
        Self {
            category,
            sort: SortMode::parse(sort),
        }
    }

    /// Whether `doc` passes the category filter.
    ///
    /// An array `category` matches when it contains the value; a scalar
    /// string matches when it equals it.
    #[must_use]
    pub fn matches_category(&self, doc: &Value) -> bool {
        let Some(wanted) = self.category.as_deref() else {
            return true;
        };
        match doc.get(fields::CATEGORY) {
            Some(Value::Array(items)) => items.iter().any(|v| v.as_str() == Some(wanted)),
            Some(Value::String(s)) => s == wanted,
            _ => false,
        }
    }
}

fn nulls_first_asc<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => cmp(&x, &y),
    }
}

fn nulls_last_desc<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => cmp(&y, &x),
    }
}

fn field_desc(a: &Value, b: &Value, key: &str) -> Ordering {
    nulls_last_desc(a.get(key), b.get(key), |x, y| json_cmp(x, y))
}

/// Ordering between raw JSON values, following Postgres `jsonb` rules:
/// null < string < number < boolean < array < object. Arrays and objects
/// compare equal among themselves.
#[must_use]
pub fn json_cmp(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::String(_) => 1,
            Value::Number(_) => 2,
            Value::Bool(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => Ordering::Equal,
        },
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
