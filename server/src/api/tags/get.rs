use crate::api::{ApiError, ErrorResponse};
use crate::store::PgStore;
use axum::{
    extract::{Path, State},
    Json,
};
use foodgram_core::{CatalogStore, DomainError, Tag, TagId};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/tags/{id}",
    tag = "tags",
    params(
        ("id" = i32, Path, description = "Tag ID")
    ),
    responses(
        (status = 200, description = "Tag", body = Tag),
        (status = 404, description = "Tag not found", body = ErrorResponse)
    )
)]
pub async fn get_tag(
    State(store): State<Arc<PgStore>>,
    Path(id): Path<TagId>,
) -> Result<Json<Tag>, ApiError> {
    let tag = store
        .tag_by_id(id)?
        .ok_or(DomainError::NotFound { entity: "tag" })?;
    Ok(Json(tag))
}
