use super::{load_editable, load_recipe};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::store::PgStore;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use foodgram_core::{
    project_recipe, validate_update, writer, RecipeId, RecipeInput, RecipeView,
};
use std::sync::Arc;

/// Partial update. Omitted fields keep their value; `tags` and `ingredients`,
/// when present, replace the whole set.
#[utoipa::path(
    patch,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    request_body = RecipeInput,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeView),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_recipe(
    AuthUser(user): AuthUser,
    State(store): State<Arc<PgStore>>,
    Path(id): Path<RecipeId>,
    payload: Result<Json<RecipeInput>, JsonRejection>,
) -> Result<Json<RecipeView>, ApiError> {
    let store: &PgStore = &store;
    load_editable(store, id, &user)?;

    let Json(input) = payload?;
    let changes = validate_update(store, input)?;
    writer::update_recipe(store, id, &changes)?;

    let recipe = load_recipe(store, id)?;
    Ok(Json(project_recipe(store, recipe, Some(user.id))?))
}
