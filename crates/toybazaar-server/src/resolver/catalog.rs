use toybazaar_core::{CatalogQuery, ToySummary};
use toybazaar_db::ToyStore;

use super::ResolveError;

/// List products for the storefront grid.
///
/// An absent, empty or `"All"` category lists everything; an unknown sort
/// key falls back to popularity. At most `CATALOG_LIMIT` summaries.
///
/// # Errors
///
/// Returns [`ResolveError::Configuration`] or [`ResolveError::StoreUnavailable`]
/// when the store query fails.
pub async fn resolve_catalog(
    store: &ToyStore,
    category: Option<&str>,
    sort: Option<&str>,
) -> Result<Vec<ToySummary>, ResolveError> {
    let query = CatalogQuery::from_params(category, sort);
    let rows = store.list(&query).await?;

    tracing::debug!(
        category = query.category.as_deref().unwrap_or("All"),
        sort = %query.sort,
        count = rows.len(),
        "resolved catalog"
    );

    Ok(rows
        .iter()
        .map(|row| ToySummary::from_document(row.id, &row.doc))
        .collect())
}
