use crate::api::{ApiError, ErrorResponse};
use crate::store::PgStore;
use axum::{
    extract::{Path, State},
    Json,
};
use foodgram_core::{CatalogStore, DomainError, Ingredient, IngredientId};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/ingredients/{id}",
    tag = "ingredients",
    params(
        ("id" = i32, Path, description = "Ingredient ID")
    ),
    responses(
        (status = 200, description = "Ingredient", body = Ingredient),
        (status = 404, description = "Ingredient not found", body = ErrorResponse)
    )
)]
pub async fn get_ingredient(
    State(store): State<Arc<PgStore>>,
    Path(id): Path<IngredientId>,
) -> Result<Json<Ingredient>, ApiError> {
    let ingredient = store
        .ingredient_by_id(id)?
        .ok_or(DomainError::NotFound {
            entity: "ingredient",
        })?;
    Ok(Json(ingredient))
}
