use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::slug::slug_or_derived;
use crate::toys::{fields, number_from_f64};
use crate::ConfigError;

#[derive(Debug, Clone, Deserialize)]
pub struct ToySeed {
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_stock")]
    pub stock: Option<String>,
    pub slug: Option<String>,
}

impl ToySeed {
    /// The explicit slug if one is given, otherwise one derived from the name.
    #[must_use]
    pub fn slug(&self) -> String {
        slug_or_derived(self.slug.as_deref(), &self.name)
    }

    /// The document inserted for this product, stamped with `created` and a
    /// zero popularity.
    #[must_use]
    pub fn to_document(&self, created: DateTime<Utc>) -> Value {
        let mut doc = Map::new();
        doc.insert(fields::NAME.to_string(), Value::from(self.name.trim()));
        doc.insert(fields::SLUG.to_string(), Value::from(self.slug()));
        doc.insert(
            fields::PRICE.to_string(),
            number_from_f64(self.price).map_or(Value::Null, Value::Number),
        );
        if let Some(description) = &self.description {
            doc.insert(fields::DESCRIPTION.to_string(), Value::from(description.as_str()));
        }
        doc.insert(fields::IMAGES.to_string(), Value::from(self.images.clone()));
        doc.insert(fields::CATEGORY.to_string(), Value::from(self.category.clone()));
        if let Some(stock) = &self.stock {
            doc.insert(fields::STOCK.to_string(), Value::from(stock.as_str()));
        }
        doc.insert(fields::POPULARITY.to_string(), Value::from(0));
        doc.insert(
            fields::CREATED.to_string(),
            Value::from(created.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        Value::Object(doc)
    }
}

#[derive(Debug, Deserialize)]
pub struct ToysFile {
    pub toys: Vec<ToySeed>,
}

/// Load and validate seed products from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_toys(path: &Path) -> Result<ToysFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ToysFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let toys_file: ToysFile = serde_yaml::from_str(&content)?;
    validate_toys(&toys_file)?;

    Ok(toys_file)
}

fn validate_toys(toys_file: &ToysFile) -> Result<(), ConfigError> {
    let mut seen_slugs = HashSet::new();

    for toy in &toys_file.toys {
        if toy.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "toy name must be non-empty".to_string(),
            ));
        }

        if !toy.price.is_finite() || toy.price < 0.0 {
            return Err(ConfigError::Validation(format!(
                "toy '{}' has invalid price {}",
                toy.name, toy.price
            )));
        }

        let slug = toy.slug();
        if slug.is_empty() {
            return Err(ConfigError::Validation(format!(
                "toy '{}' has an empty slug",
                toy.name
            )));
        }
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate toy slug: '{}' (from toy '{}')",
                slug, toy.name
            )));
        }
    }

    Ok(())
}

/// Accepts `stock: "0"` as well as `stock: 0`.
fn deserialize_stock<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stock {
        Text(String),
        Count(u64),
    }

    Ok(Option::<Stock>::deserialize(deserializer)?.map(|s| match s {
        Stock::Text(t) => t,
        Stock::Count(n) => n.to_string(),
    }))
}
