use crate::api::ApiError;
use crate::store::PgStore;
use axum::{
    extract::{Query, State},
    Json,
};
use foodgram_core::{CatalogStore, Ingredient};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListIngredientsParams {
    /// Case-insensitive prefix of the ingredient name
    pub name: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/ingredients",
    tag = "ingredients",
    params(ListIngredientsParams),
    responses(
        (status = 200, description = "Matching ingredients, ordered by name", body = Vec<Ingredient>)
    )
)]
pub async fn list_ingredients(
    State(store): State<Arc<PgStore>>,
    Query(params): Query<ListIngredientsParams>,
) -> Result<Json<Vec<Ingredient>>, ApiError> {
    let prefix = params.name.as_deref().map(str::trim).unwrap_or_default();
    Ok(Json(store.search_ingredients_by_prefix(prefix)?))
}
