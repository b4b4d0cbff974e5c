use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;
use crate::resolver::item;

use super::{map_resolve_error, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ContactQuery {
    /// Storefront page the shopper is looking at; quoted in the message.
    #[serde(default)]
    pub page_url: String,
}

#[derive(Debug, Serialize)]
pub(super) struct ContactResponse {
    url: String,
}

pub(super) async fn contact_link(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(identifier): Path<String>,
    Query(query): Query<ContactQuery>,
) -> Result<Json<ContactResponse>, ApiError> {
    let url = item::contact_link(
        &state.store,
        &identifier,
        state.contact_phone.as_deref(),
        &query.page_url,
    )
    .await
    .map_err(|e| map_resolve_error(&req_id.0, e))?;
    Ok(Json(ContactResponse { url }))
}
