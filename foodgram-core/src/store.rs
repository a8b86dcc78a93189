//! Storage interfaces the recipe pipeline runs against.
//!
//! The server implements these over PostgreSQL; [`crate::MemoryStore`]
//! implements them in memory for tests. All methods are synchronous, the same
//! way diesel queries are.

use std::collections::HashSet;

use crate::catalog::CatalogStore;
use crate::error::DomainError;
use crate::types::{
    Ingredient, IngredientAmount, Page, PageRequest, RecipeFieldChanges, RecipeFields, RecipeId,
    RecipeList, RecipeRecord, ResolvedIngredient, Tag, TagId, User, UserId,
};

/// Writes performed inside one transaction.
///
/// Returning an error from any method and propagating it out of the
/// transaction closure discards every write made through the same unit of work.
pub trait UnitOfWork {
    /// Insert the recipe row. A clash on `(name, author)` is a `Conflict`.
    fn insert_recipe(&mut self, author: UserId, fields: &RecipeFields)
        -> Result<RecipeId, DomainError>;

    fn update_recipe(
        &mut self,
        recipe: RecipeId,
        changes: &RecipeFieldChanges,
    ) -> Result<(), DomainError>;

    /// Replace the full tag set of a recipe.
    fn replace_tags(&mut self, recipe: RecipeId, tags: &[TagId]) -> Result<(), DomainError>;

    /// Replace the full ingredient set of a recipe.
    fn replace_ingredients(
        &mut self,
        recipe: RecipeId,
        ingredients: &[ResolvedIngredient],
    ) -> Result<(), DomainError>;

    /// Returns false when there was nothing to delete.
    fn delete_recipe(&mut self, recipe: RecipeId) -> Result<bool, DomainError>;
}

/// Filters for the recipe listing. All present filters must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub author: Option<UserId>,
    /// Tag slugs; a recipe matches if it carries any of them.
    pub tags: Vec<String>,
    pub is_favorited: Option<bool>,
    pub is_in_shopping_cart: Option<bool>,
}

impl RecipeFilter {
    /// Drop per-user filters for anonymous viewers and de-duplicate tag slugs.
    pub fn normalized_for(mut self, viewer: Option<UserId>) -> Self {
        if viewer.is_none() {
            self.is_favorited = None;
            self.is_in_shopping_cart = None;
        }
        let mut seen = HashSet::new();
        self.tags.retain(|slug| seen.insert(slug.clone()));
        self
    }
}

pub trait RecipeStore {
    /// Run `f` as a single all-or-nothing unit of work.
    fn transaction<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, DomainError>;

    fn recipe_by_id(&self, id: RecipeId) -> Result<Option<RecipeRecord>, DomainError>;

    /// Newest first. `viewer` is used by the favorited/cart filters.
    fn find_recipes(
        &self,
        filter: &RecipeFilter,
        viewer: Option<UserId>,
        page: PageRequest,
    ) -> Result<Page<RecipeRecord>, DomainError>;

    /// Tags of each recipe, ordered by tag name.
    fn tags_for_recipes(&self, recipes: &[RecipeId]) -> Result<Vec<(RecipeId, Tag)>, DomainError>;

    /// Ingredient rows of each recipe, ordered by ingredient name.
    fn ingredients_for_recipes(
        &self,
        recipes: &[RecipeId],
    ) -> Result<Vec<(RecipeId, IngredientAmount)>, DomainError>;

    /// All recipes written by any of `authors`, newest first.
    fn recipes_by_authors(&self, authors: &[UserId]) -> Result<Vec<RecipeRecord>, DomainError>;
}

pub trait UserStore {
    fn users_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, DomainError>;

    /// All users ordered by id.
    fn list_users(&self, page: PageRequest) -> Result<Page<User>, DomainError>;

    fn user_by_id(&self, id: UserId) -> Result<Option<User>, DomainError> {
        Ok(self.users_by_ids(&[id])?.into_iter().next())
    }
}

/// Favorites and shopping cart membership.
pub trait ListStore {
    /// Which of `recipes` are in the user's list.
    fn listed_among(
        &self,
        list: RecipeList,
        user: UserId,
        recipes: &[RecipeId],
    ) -> Result<HashSet<RecipeId>, DomainError>;

    /// A duplicate entry is a `Conflict`.
    fn add_to_list(&self, list: RecipeList, user: UserId, recipe: RecipeId)
        -> Result<(), DomainError>;

    /// Returns false when the recipe was not in the list.
    fn remove_from_list(
        &self,
        list: RecipeList,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<bool, DomainError>;

    /// Every ingredient join row of every recipe in the user's cart.
    /// Whether the user has at least one recipe in the list.
    fn has_entries(&self, list: RecipeList, user: UserId) -> Result<bool, DomainError>;

    fn cart_ingredient_rows(&self, user: UserId) -> Result<Vec<(Ingredient, i32)>, DomainError>;
}

pub trait SubscriptionStore {
    /// Which of `authors` the user is subscribed to.
    fn subscribed_among(
        &self,
        user: UserId,
        authors: &[UserId],
    ) -> Result<HashSet<UserId>, DomainError>;

    /// A duplicate pair is a `Conflict`; `user == author` is a `SelfReference`.
    fn insert_subscription(&self, user: UserId, author: UserId) -> Result<(), DomainError>;

    /// Returns false when there was no such subscription.
    fn delete_subscription(&self, user: UserId, author: UserId) -> Result<bool, DomainError>;

    /// Authors the user follows, ordered by username.
    fn subscribed_authors(&self, user: UserId, page: PageRequest)
        -> Result<Page<User>, DomainError>;
}

/// Everything the request handlers need from a backend.
pub trait Store: CatalogStore + RecipeStore + UserStore + ListStore + SubscriptionStore {}

impl<T> Store for T where T: CatalogStore + RecipeStore + UserStore + ListStore + SubscriptionStore {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_anonymous_drops_user_flags() {
        let filter = RecipeFilter {
            author: Some(3),
            tags: vec!["lunch".to_string()],
            is_favorited: Some(true),
            is_in_shopping_cart: Some(false),
        }
        .normalized_for(None);

        assert_eq!(filter.author, Some(3));
        assert_eq!(filter.is_favorited, None);
        assert_eq!(filter.is_in_shopping_cart, None);
    }

    #[test]
    fn test_filter_dedups_tags() {
        let filter = RecipeFilter {
            tags: vec![
                "lunch".to_string(),
                "dinner".to_string(),
                "lunch".to_string(),
            ],
            is_favorited: Some(true),
            ..Default::default()
        }
        .normalized_for(Some(1));

        assert_eq!(filter.tags, vec!["lunch", "dinner"]);
        assert_eq!(filter.is_favorited, Some(true));
    }
}
