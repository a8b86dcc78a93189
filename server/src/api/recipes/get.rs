use super::load_recipe;
use crate::api::{ApiError, ErrorResponse};
use crate::auth::MaybeUser;
use crate::store::PgStore;
use axum::{
    extract::{Path, State},
    Json,
};
use foodgram_core::{project_recipe, RecipeId, RecipeView};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe details", body = RecipeView),
        (status = 401, description = "Invalid token", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn get_recipe(
    MaybeUser(user): MaybeUser,
    State(store): State<Arc<PgStore>>,
    Path(id): Path<RecipeId>,
) -> Result<Json<RecipeView>, ApiError> {
    let store: &PgStore = &store;
    let recipe = load_recipe(store, id)?;
    let viewer = user.map(|u| u.id);
    Ok(Json(project_recipe(store, recipe, viewer)?))
}
