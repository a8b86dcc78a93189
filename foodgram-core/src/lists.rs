//! Favorites and shopping cart: per-user recipe lists.

use crate::error::DomainError;
use crate::projection::ShortRecipeView;
use crate::store::{ListStore, RecipeStore};
use crate::types::{RecipeId, RecipeList, UserId};

/// The error stores return when a recipe is already in the list.
pub fn already_listed(list: RecipeList) -> DomainError {
    DomainError::conflict(
        list.field(),
        format!("Recipe is already in {}", list.label()),
    )
}

pub fn add_to_list<S>(
    store: &S,
    list: RecipeList,
    user: UserId,
    recipe_id: RecipeId,
) -> Result<ShortRecipeView, DomainError>
where
    S: RecipeStore + ListStore + ?Sized,
{
    let recipe = store
        .recipe_by_id(recipe_id)?
        .ok_or(DomainError::NotFound { entity: "recipe" })?;

    store.add_to_list(list, user, recipe_id)?;
    tracing::info!(user_id = user, recipe_id, list = list.field(), "recipe listed");

    Ok(ShortRecipeView::from(&recipe))
}

pub fn remove_from_list<S>(
    store: &S,
    list: RecipeList,
    user: UserId,
    recipe_id: RecipeId,
) -> Result<(), DomainError>
where
    S: RecipeStore + ListStore + ?Sized,
{
    if store.recipe_by_id(recipe_id)?.is_none() {
        return Err(DomainError::NotFound { entity: "recipe" });
    }
    if !store.remove_from_list(list, user, recipe_id)? {
        return Err(DomainError::NotFound {
            entity: list.field(),
        });
    }
    tracing::info!(user_id = user, recipe_id, list = list.field(), "recipe unlisted");
    Ok(())
}
