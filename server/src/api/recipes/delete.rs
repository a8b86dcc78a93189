use super::load_editable;
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::store::PgStore;
use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use foodgram_core::{writer, RecipeId};
use std::sync::Arc;

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_recipe(
    AuthUser(user): AuthUser,
    State(store): State<Arc<PgStore>>,
    Path(id): Path<RecipeId>,
) -> Result<StatusCode, ApiError> {
    let store: &PgStore = &store;
    load_editable(store, id, &user)?;
    writer::delete_recipe(store, id)?;
    Ok(StatusCode::NO_CONTENT)
}
