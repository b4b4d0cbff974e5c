use serde_json::Value;
use tokio::task::JoinHandle;
use toybazaar_core::lookup::parse_primary_key;
use toybazaar_core::toys::fields;
use toybazaar_core::{build_whatsapp_link, coerce_price, ItemKey, ToyDetail, ToyUpdate};
use toybazaar_db::{ToyRow, ToyStore};
use uuid::Uuid;

use super::ResolveError;

const INVALID_ID: &str = "Invalid id";
const INVALID_JSON_BODY: &str = "Invalid JSON body";
const NO_VALID_FIELDS: &str = "No valid fields to update";

/// Resolve `identifier` to a stored document.
///
/// Tries each strategy in `RESOLUTION_ORDER` and returns the first hit. A
/// valid primary key is only looked up by key.
///
/// # Errors
///
/// Returns [`ResolveError::NotFound`] when no strategy matches, or a store
/// error.
pub async fn find_item(store: &ToyStore, identifier: &str) -> Result<ToyRow, ResolveError> {
    let key = ItemKey::parse(identifier);

    for strategy in toybazaar_core::RESOLUTION_ORDER {
        let Some(lookup) = strategy.lookup(&key) else {
            continue;
        };
        if let Some(row) = store.find(&lookup).await? {
            tracing::debug!(strategy = strategy.as_str(), toy_id = %row.id, "resolved item");
            return Ok(row);
        }
    }

    Err(ResolveError::NotFound)
}

/// Resolve a product for display and bump its popularity in the background.
///
/// The returned handle completes once the bump has run; a failed bump is
/// logged and never affects the read.
///
/// # Errors
///
/// Same as [`find_item`].
pub async fn get_item(
    store: &ToyStore,
    identifier: &str,
) -> Result<(ToyDetail, JoinHandle<()>), ResolveError> {
    let row = find_item(store, identifier).await?;
    let bump = spawn_popularity_bump(store.clone(), row.id);
    Ok((ToyDetail::from_document(row.id, &row.doc), bump))
}

fn spawn_popularity_bump(store: ToyStore, id: Uuid) -> JoinHandle<()> {
    tokio::spawn(async move {
        match store.increment_popularity(id).await {
            Ok(Some(_)) => {}
            Ok(None) => tracing::warn!(toy_id = %id, "popularity bump found no product"),
            Err(e) => tracing::warn!(toy_id = %id, error = %e, "popularity bump failed"),
        }
    })
}

/// Apply a partial update to the product with primary key `identifier`.
///
/// Checks run in order: identifier, JSON syntax, recognized fields.
///
/// # Errors
///
/// - [`ResolveError::InvalidInput`] for a non-key identifier, a body that is
///   not JSON, or a body with no recognized field. The store is untouched.
/// - [`ResolveError::NotFound`] if no product has this key.
pub async fn update_item(
    store: &ToyStore,
    identifier: &str,
    body: &[u8],
) -> Result<ToyDetail, ResolveError> {
    let id = parse_primary_key(identifier).ok_or(ResolveError::InvalidInput(INVALID_ID))?;
    let body: Value = serde_json::from_slice(body)
        .map_err(|_| ResolveError::InvalidInput(INVALID_JSON_BODY))?;
    let update =
        ToyUpdate::from_json(&body).map_err(|_| ResolveError::InvalidInput(NO_VALID_FIELDS))?;

    let row = store
        .update(id, &update)
        .await?
        .ok_or(ResolveError::NotFound)?;
    tracing::info!(toy_id = %id, "updated toy");
    Ok(ToyDetail::from_document(row.id, &row.doc))
}

/// Record a like and return the new popularity.
///
/// # Errors
///
/// [`ResolveError::InvalidInput`] for a non-key identifier,
/// [`ResolveError::NotFound`] if no product has this key.
pub async fn like_item(store: &ToyStore, identifier: &str) -> Result<i64, ResolveError> {
    let id = parse_primary_key(identifier).ok_or(ResolveError::InvalidInput(INVALID_ID))?;
    store
        .increment_popularity(id)
        .await?
        .ok_or(ResolveError::NotFound)
}

/// Deep link asking about the product over WhatsApp. Does not count as a view.
///
/// # Errors
///
/// [`ResolveError::Configuration`] when no contact phone is configured,
/// otherwise the errors of [`find_item`].
pub async fn contact_link(
    store: &ToyStore,
    identifier: &str,
    phone: Option<&str>,
    page_url: &str,
) -> Result<String, ResolveError> {
    let phone = phone.ok_or_else(|| {
        ResolveError::Configuration("TOYBAZAAR_CONTACT_PHONE is not set".to_string())
    })?;
    let row = find_item(store, identifier).await?;

    let name = row
        .doc
        .get(fields::NAME)
        .and_then(Value::as_str)
        .unwrap_or_default();
    let price = coerce_price(row.doc.get(fields::PRICE));
    Ok(build_whatsapp_link(phone, name, price.as_ref(), page_url))
}
