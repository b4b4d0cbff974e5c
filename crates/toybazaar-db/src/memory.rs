//! Process-local document store.
//!
//! Backs the server when no database is configured and drives the store
//! tests. Documents live in a key-ordered map behind one mutex, so every
//! operation (including the popularity increment) is atomic.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use regex::RegexBuilder;
use serde_json::{Number, Value};
use toybazaar_core::toys::fields;
use toybazaar_core::{CatalogQuery, Lookup, ToyUpdate, CATALOG_LIMIT};
use uuid::Uuid;

use crate::toys::ToyRow;
use crate::DbError;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    docs: Arc<Mutex<BTreeMap<Uuid, Value>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn docs(&self) -> MutexGuard<'_, BTreeMap<Uuid, Value>> {
        self.docs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs().is_empty()
    }

    #[must_use]
    pub fn list(&self, query: &CatalogQuery) -> Vec<ToyRow> {
        let docs = self.docs();
        let mut matched: Vec<(&Uuid, &Value)> = docs
            .iter()
            .filter(|(_, doc)| query.matches_category(doc))
            .collect();
        matched.sort_by(|a, b| query.sort.compare((*a.0, a.1), (*b.0, b.1)));
        matched
            .into_iter()
            .take(CATALOG_LIMIT)
            .map(|(id, doc)| ToyRow {
                id: *id,
                doc: doc.clone(),
            })
            .collect()
    }

    /// First document in key order matched by `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidPattern`] if a name pattern does not compile.
    pub fn find(&self, lookup: &Lookup) -> Result<Option<ToyRow>, DbError> {
        let docs = self.docs();
        let found = match lookup {
            Lookup::PrimaryKey(id) => docs.get_key_value(id),
            Lookup::Slug(slug) => docs
                .iter()
                .find(|(_, doc)| string_field(doc, fields::SLUG) == Some(slug.as_str())),
            Lookup::NamePattern(pattern) => {
                let re = RegexBuilder::new(pattern).case_insensitive(true).build()?;
                docs.iter().find(|(_, doc)| {
                    string_field(doc, fields::NAME).is_some_and(|name| re.is_match(name))
                })
            }
        };

        Ok(found.map(|(id, doc)| ToyRow {
            id: *id,
            doc: doc.clone(),
        }))
    }

    /// Adds one to `popularity` and returns the new value, or `None` if no
    /// document has this id. A non-numeric counter restarts from zero.
    #[must_use]
    pub fn increment_popularity(&self, id: Uuid) -> Option<i64> {
        let mut docs = self.docs();
        let doc = docs.get_mut(&id)?.as_object_mut()?;

        let next = match doc.get(fields::POPULARITY) {
            Some(Value::Number(n)) => increment(n),
            _ => Number::from(1),
        };
        let popularity = truncate(&next);
        doc.insert(fields::POPULARITY.to_string(), Value::Number(next));
        Some(popularity)
    }

    #[must_use]
    pub fn update(&self, id: Uuid, update: &ToyUpdate) -> Option<ToyRow> {
        let mut docs = self.docs();
        let doc = docs.get_mut(&id)?;
        if let (Some(target), Value::Object(set)) = (doc.as_object_mut(), update.to_set_document())
        {
            target.extend(set);
        }
        Some(ToyRow {
            id,
            doc: doc.clone(),
        })
    }

    /// Inserts a new document under a fresh time-ordered key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidDocument`] if `doc` is not an object.
    pub fn insert(&self, doc: Value) -> Result<Uuid, DbError> {
        if !doc.is_object() {
            return Err(DbError::InvalidDocument);
        }
        let id = Uuid::now_v7();
        self.docs().insert(id, doc);
        Ok(id)
    }

    /// Inserts `doc` unless a document with the same string `slug` exists.
    /// Returns whether it was inserted.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidDocument`] if `doc` is not an object.
    pub fn insert_if_slug_absent(&self, doc: Value) -> Result<bool, DbError> {
        if !doc.is_object() {
            return Err(DbError::InvalidDocument);
        }
        let mut docs = self.docs();
        if let Some(slug) = string_field(&doc, fields::SLUG) {
            if docs
                .values()
                .any(|existing| string_field(existing, fields::SLUG) == Some(slug))
            {
                return Ok(false);
            }
        }
        docs.insert(Uuid::now_v7(), doc);
        Ok(true)
    }

    #[must_use]
    pub fn append_image(&self, id: Uuid, url: &str) -> Option<ToyRow> {
        let mut docs = self.docs();
        let doc = docs.get_mut(&id)?;
        if let Some(obj) = doc.as_object_mut() {
            let images = obj
                .entry(fields::IMAGES)
                .or_insert_with(|| Value::Array(Vec::new()));
            if !images.is_array() {
                *images = Value::Array(Vec::new());
            }
            if let Value::Array(items) = images {
                items.push(Value::from(url));
            }
        }
        Some(ToyRow {
            id,
            doc: doc.clone(),
        })
    }
}

fn string_field<'a>(doc: &'a Value, key: &str) -> Option<&'a str> {
    doc.get(key).and_then(Value::as_str)
}

fn increment(n: &Number) -> Number {
    if let Some(v) = n.as_i64().and_then(|v| v.checked_add(1)) {
        return Number::from(v);
    }
    if let Some(v) = n.as_u64().and_then(|v| v.checked_add(1)) {
        return Number::from(v);
    }
    n.as_f64()
        .and_then(|v| Number::from_f64(v + 1.0))
        .unwrap_or_else(|| Number::from(1))
}

#[allow(clippy::cast_possible_truncation)]
fn truncate(n: &Number) -> i64 {
    n.as_i64()
        .or_else(|| n.as_u64().map(|v| i64::try_from(v).unwrap_or(i64::MAX)))
        .or_else(|| n.as_f64().map(|v| v.trunc() as i64))
        .unwrap_or(0)
}
