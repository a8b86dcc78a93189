use super::load_recipe;
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::store::PgStore;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use foodgram_core::{project_recipe, validate_create, writer, RecipeInput, RecipeView};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body(content = RecipeInput, example = json!({
        "ingredients": [{"id": 1123, "amount": 10}],
        "tags": [1, 2],
        "image": "data:image/png;base64,iVBORw0KGgo=",
        "name": "Pancakes",
        "text": "Mix and fry.",
        "cooking_time": 20
    })),
    responses(
        (status = 201, description = "Recipe created", body = RecipeView),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(store): State<Arc<PgStore>>,
    payload: Result<Json<RecipeInput>, JsonRejection>,
) -> Result<(StatusCode, Json<RecipeView>), ApiError> {
    let Json(input) = payload?;
    let store: &PgStore = &store;

    let validated = validate_create(store, user.id, input)?;
    let recipe_id = writer::create_recipe(store, &validated)?;

    let recipe = load_recipe(store, recipe_id)?;
    let view = project_recipe(store, recipe, Some(user.id))?;
    Ok((StatusCode::CREATED, Json(view)))
}
