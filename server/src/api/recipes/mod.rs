pub mod create;
pub mod delete;
pub mod download;
pub mod get;
pub mod list;
pub mod lists;
pub mod update;

use crate::api::ApiError;
use crate::store::PgStore;
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use foodgram_core::{DomainError, RecipeId, RecipeRecord, RecipeStore, User};
use utoipa::OpenApi;

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes).post(create::create_recipe))
        .route(
            "/download_shopping_cart",
            get(download::download_shopping_cart),
        )
        .route(
            "/{id}",
            get(get::get_recipe)
                .patch(update::update_recipe)
                .delete(delete::delete_recipe),
        )
        .route(
            "/{id}/favorite",
            post(lists::add_favorite).delete(lists::remove_favorite),
        )
        .route(
            "/{id}/shopping_cart",
            post(lists::add_to_cart).delete(lists::remove_from_cart),
        )
}

/// Load a recipe or fail with 404.
fn load_recipe(store: &PgStore, id: RecipeId) -> Result<RecipeRecord, ApiError> {
    store
        .recipe_by_id(id)?
        .ok_or_else(|| DomainError::NotFound { entity: "recipe" }.into())
}

/// Load a recipe the user is allowed to change: 404 if absent, 403 if not theirs.
fn load_editable(store: &PgStore, id: RecipeId, user: &User) -> Result<RecipeRecord, ApiError> {
    let recipe = load_recipe(store, id)?;
    if !recipe.editable_by(user) {
        return Err(ApiError::forbidden(
            "Only the author or an admin can change this recipe",
        ));
    }
    Ok(recipe)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_recipe,
        list::list_recipes,
        get::get_recipe,
        update::update_recipe,
        delete::delete_recipe,
        lists::add_favorite,
        lists::remove_favorite,
        lists::add_to_cart,
        lists::remove_from_cart,
        download::download_shopping_cart,
    ),
    components(schemas(
        foodgram_core::RecipeInput,
        foodgram_core::IngredientInput,
        foodgram_core::RecipeView,
        foodgram_core::ShortRecipeView,
        foodgram_core::AuthorView,
        foodgram_core::IngredientAmount,
        foodgram_core::Tag,
        list::RecipePage,
    ))
)]
pub struct ApiDoc;
