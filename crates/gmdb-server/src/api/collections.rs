use axum::{
    extract::{Path, State},
    Extension, Json,
};
use gmdb_core::{Collection, Store};
use serde::Serialize;

use super::{map_store_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Serialize)]
pub(super) struct ClearedCollection {
    collection: &'static str,
    deleted: u64,
}

pub(super) async fn clear_collection(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(collection): Path<String>,
) -> Result<Json<ApiResponse<ClearedCollection>>, ApiError> {
    let collection: Collection = collection
        .parse()
        .map_err(|e: gmdb_core::CoreError| {
            ApiError::new(req_id.0.clone(), "validation_error", e.to_string())
        })?;

    let deleted = state
        .store
        .delete_all(collection)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;
    tracing::warn!(%collection, deleted, "collection cleared");

    Ok(Json(ApiResponse {
        data: ClearedCollection {
            collection: collection.as_str(),
            deleted,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
