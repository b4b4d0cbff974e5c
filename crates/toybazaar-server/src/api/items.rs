use axum::{
    body::Bytes,
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use toybazaar_core::ToyDetail;

use crate::middleware::RequestId;
use crate::resolver::item;

use super::{map_resolve_error, ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct LikeResponse {
    popularity: i64,
}

pub(super) async fn get_item(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(identifier): Path<String>,
) -> Result<Json<ToyDetail>, ApiError> {
    // The popularity bump keeps running after the response is sent.
    let (detail, _bump) = item::get_item(&state.store, &identifier)
        .await
        .map_err(|e| map_resolve_error(&req_id.0, e))?;
    Ok(Json(detail))
}

pub(super) async fn update_item(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(identifier): Path<String>,
    body: Bytes,
) -> Result<Json<ToyDetail>, ApiError> {
    let detail = item::update_item(&state.store, &identifier, &body)
        .await
        .map_err(|e| map_resolve_error(&req_id.0, e))?;
    Ok(Json(detail))
}

pub(super) async fn like_item(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(identifier): Path<String>,
) -> Result<Json<LikeResponse>, ApiError> {
    let popularity = item::like_item(&state.store, &identifier)
        .await
        .map_err(|e| map_resolve_error(&req_id.0, e))?;
    Ok(Json(LikeResponse { popularity }))
}
