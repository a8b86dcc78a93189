//! Favorites and shopping cart membership.
//!
//! Every failure on these endpoints is reported as 400, including an unknown
//! recipe.

use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::store::PgStore;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use foodgram_core::{lists, RecipeId, RecipeList, ShortRecipeView, User};
use std::sync::Arc;

fn add(
    store: &PgStore,
    list: RecipeList,
    user: &User,
    recipe_id: RecipeId,
) -> Result<(StatusCode, Json<ShortRecipeView>), ApiError> {
    let view = lists::add_to_list(store, list, user.id, recipe_id).map_err(ApiError::bad_request)?;
    Ok((StatusCode::CREATED, Json(view)))
}

fn remove(
    store: &PgStore,
    list: RecipeList,
    user: &User,
    recipe_id: RecipeId,
) -> Result<StatusCode, ApiError> {
    lists::remove_from_list(store, list, user.id, recipe_id).map_err(ApiError::bad_request)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/favorite",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 201, description = "Added to favorites", body = ShortRecipeView),
        (status = 400, description = "Unknown recipe or already a favorite", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn add_favorite(
    AuthUser(user): AuthUser,
    State(store): State<Arc<PgStore>>,
    Path(id): Path<RecipeId>,
) -> Result<(StatusCode, Json<ShortRecipeView>), ApiError> {
    add(&store, RecipeList::Favorites, &user, id)
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/favorite",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Removed from favorites"),
        (status = 400, description = "Unknown recipe or not a favorite", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn remove_favorite(
    AuthUser(user): AuthUser,
    State(store): State<Arc<PgStore>>,
    Path(id): Path<RecipeId>,
) -> Result<StatusCode, ApiError> {
    remove(&store, RecipeList::Favorites, &user, id)
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/shopping_cart",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 201, description = "Added to shopping cart", body = ShortRecipeView),
        (status = 400, description = "Unknown recipe or already in the cart", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn add_to_cart(
    AuthUser(user): AuthUser,
    State(store): State<Arc<PgStore>>,
    Path(id): Path<RecipeId>,
) -> Result<(StatusCode, Json<ShortRecipeView>), ApiError> {
    add(&store, RecipeList::ShoppingCart, &user, id)
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/shopping_cart",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Removed from shopping cart"),
        (status = 400, description = "Unknown recipe or not in the cart", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn remove_from_cart(
    AuthUser(user): AuthUser,
    State(store): State<Arc<PgStore>>,
    Path(id): Path<RecipeId>,
) -> Result<StatusCode, ApiError> {
    remove(&store, RecipeList::ShoppingCart, &user, id)
}
