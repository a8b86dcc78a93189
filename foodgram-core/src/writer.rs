//! Atomic recipe writes.
//!
//! Every operation runs inside a single [`RecipeStore::transaction`]: the
//! recipe row, its tag links and its ingredient rows are committed together or
//! not at all.

use crate::error::DomainError;
use crate::store::RecipeStore;
use crate::types::{RecipeId, Tag, TagId};
use crate::validator::{ValidatedChanges, ValidatedRecipe};

pub fn create_recipe<S>(store: &S, recipe: &ValidatedRecipe) -> Result<RecipeId, DomainError>
where
    S: RecipeStore + ?Sized,
{
    let tag_ids = tag_ids(&recipe.tags);
    let recipe_id = store.transaction(|uow| {
        let id = uow.insert_recipe(recipe.author, &recipe.fields)?;
        uow.replace_tags(id, &tag_ids)?;
        uow.replace_ingredients(id, &recipe.ingredients)?;
        Ok(id)
    })?;

    tracing::info!(
        recipe_id,
        author_id = recipe.author,
        tags = tag_ids.len(),
        ingredients = recipe.ingredients.len(),
        "recipe created"
    );
    Ok(recipe_id)
}

/// Apply scalar changes and replace whichever association sets were supplied.
pub fn update_recipe<S>(
    store: &S,
    recipe_id: RecipeId,
    changes: &ValidatedChanges,
) -> Result<(), DomainError>
where
    S: RecipeStore + ?Sized,
{
    let tag_ids = changes.tags.as_deref().map(tag_ids);
    store.transaction(|uow| {
        uow.update_recipe(recipe_id, &changes.fields)?;
        if let Some(tag_ids) = &tag_ids {
            uow.replace_tags(recipe_id, tag_ids)?;
        }
        if let Some(ingredients) = &changes.ingredients {
            uow.replace_ingredients(recipe_id, ingredients)?;
        }
        Ok(())
    })?;

    tracing::info!(recipe_id, "recipe updated");
    Ok(())
}

pub fn delete_recipe<S>(store: &S, recipe_id: RecipeId) -> Result<(), DomainError>
where
    S: RecipeStore + ?Sized,
{
    let deleted = store.transaction(|uow| uow.delete_recipe(recipe_id))?;
    if !deleted {
        return Err(DomainError::NotFound { entity: "recipe" });
    }
    tracing::info!(recipe_id, "recipe deleted");
    Ok(())
}

fn tag_ids(tags: &[Tag]) -> Vec<TagId> {
    tags.iter().map(|tag| tag.id).collect()
}
