use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use toybazaar_core::ToySummary;

use crate::middleware::RequestId;
use crate::resolver::catalog::resolve_catalog;

use super::{map_resolve_error, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct CollectionQuery {
    pub category: Option<String>,
    pub sort: Option<String>,
}

pub(super) async fn list_collection(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CollectionQuery>,
) -> Result<Json<Vec<ToySummary>>, ApiError> {
    let toys = resolve_catalog(
        &state.store,
        query.category.as_deref(),
        query.sort.as_deref(),
    )
    .await
    .map_err(|e| map_resolve_error(&req_id.0, e))?;

    Ok(Json(toys))
}
