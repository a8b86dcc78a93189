use crate::api::ApiError;
use crate::store::PgStore;
use axum::{extract::State, Json};
use foodgram_core::{CatalogStore, Tag};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/tags",
    tag = "tags",
    responses(
        (status = 200, description = "All tags, ordered by name", body = Vec<Tag>)
    )
)]
pub async fn list_tags(State(store): State<Arc<PgStore>>) -> Result<Json<Vec<Tag>>, ApiError> {
    Ok(Json(store.list_tags()?))
}
