//! Partial product updates.

use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::toys::fields;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UpdateError {
    #[error("No valid fields to update")]
    NoValidFields,
}

/// The recognized subset of a partial update body.
///
/// Fields of the wrong type are ignored rather than rejected. Arrays are
/// stored as sent; reads keep only their string elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToyUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Number>,
    pub category: Option<Vec<Value>>,
    pub images: Option<Vec<Value>>,
}

impl ToyUpdate {
    /// Extract recognized fields from a request body.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::NoValidFields`] when `body` is not an object or
    /// carries none of `name`, `description`, `price`, `category`, `images`
    /// with an acceptable type.
    pub fn from_json(body: &Value) -> Result<Self, UpdateError> {
        let Some(obj) = body.as_object() else {
            return Err(UpdateError::NoValidFields);
        };

        let update = Self {
            name: obj
                .get(fields::NAME)
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string()),
            description: obj
                .get(fields::DESCRIPTION)
                .and_then(Value::as_str)
                .map(ToOwned::to_owned),
            price: obj.get(fields::PRICE).and_then(Value::as_number).cloned(),
            category: obj.get(fields::CATEGORY).and_then(Value::as_array).cloned(),
            images: obj.get(fields::IMAGES).and_then(Value::as_array).cloned(),
        };

        if update.is_empty() {
            return Err(UpdateError::NoValidFields);
        }
        Ok(update)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.images.is_none()
    }

    /// The object merged over the stored document.
    #[must_use]
    pub fn to_set_document(&self) -> Value {
        let mut set = Map::new();
        if let Some(name) = &self.name {
            set.insert(fields::NAME.to_string(), Value::from(name.as_str()));
        }
        if let Some(description) = &self.description {
            set.insert(fields::DESCRIPTION.to_string(), Value::from(description.as_str()));
        }
        if let Some(price) = &self.price {
            set.insert(fields::PRICE.to_string(), Value::Number(price.clone()));
        }
        if let Some(category) = &self.category {
            set.insert(fields::CATEGORY.to_string(), Value::Array(category.clone()));
        }
        if let Some(images) = &self.images {
            set.insert(fields::IMAGES.to_string(), Value::Array(images.clone()));
        }
        Value::Object(set)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_object_has_no_valid_fields() {
        assert_eq!(ToyUpdate::from_json(&json!({})), Err(UpdateError::NoValidFields));
    }

    #[test]
    fn non_object_body_has_no_valid_fields() {
        for body in [json!([]), json!("name"), json!(null), json!(3)] {
            assert_eq!(ToyUpdate::from_json(&body), Err(UpdateError::NoValidFields));
        }
    }

    #[test]
    fn mistyped_fields_are_ignored() {
        let body = json!({ "price": "499", "category": "Vehicles", "images": null, "name": 5 });
        assert_eq!(ToyUpdate::from_json(&body), Err(UpdateError::NoValidFields));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let body = json!({ "popularity": 1000, "slug": "hijack", "price": 10 });
        let update = ToyUpdate::from_json(&body).unwrap();
        assert_eq!(update.to_set_document(), json!({ "price": 10 }));
    }

    #[test]
    fn name_is_trimmed() {
        let update = ToyUpdate::from_json(&json!({ "name": "  Kite  " })).unwrap();
        assert_eq!(update.name.as_deref(), Some("Kite"));
    }

    #[test]
    fn arrays_are_stored_as_sent() {
        let body = json!({ "category": ["Outdoor", 3, null, "Summer"], "images": [] });
        let update = ToyUpdate::from_json(&body).unwrap();
        assert_eq!(update.to_set_document(), body);

        let update = ToyUpdate::from_json(&json!({ "category": [1] })).unwrap();
        assert_eq!(update.to_set_document(), json!({ "category": [1] }));
    }

    #[test]
    fn set_document_carries_every_recognized_field() {
        let body = json!({
            "name": "Blue Dump Truck",
            "description": "Tips and dumps.",
            "price": 1299.5,
            "category": ["Vehicles"],
            "images": ["https://cdn.example.com/a.png"],
        });
        let update = ToyUpdate::from_json(&body).unwrap();
        assert_eq!(update.to_set_document(), body);
    }
}
