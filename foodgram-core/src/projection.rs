//! Output representation of recipes, relative to the viewing user.
//!
//! Projection of a batch costs a fixed number of store calls no matter how
//! many recipes are in it: tags, ingredients, authors, and (for signed-in
//! viewers) favorites, cart and subscriptions, each fetched once.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::DomainError;
use crate::store::{ListStore, RecipeStore, SubscriptionStore, UserStore};
use crate::types::{
    IngredientAmount, RecipeId, RecipeList, RecipeRecord, Tag, User, UserId,
};

pub const ANONYMOUS_USERNAME: &str = "AnonymousUser";
pub const MISSING_IMAGE: &str = "Image is missing.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AuthorView {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Absent on the anonymous placeholder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_subscribed: Option<bool>,
}

impl AuthorView {
    /// Stand-in for a recipe whose author account no longer exists.
    pub fn anonymous() -> Self {
        Self {
            id: 0,
            username: ANONYMOUS_USERNAME.to_string(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            is_subscribed: None,
        }
    }

    pub fn from_user(user: &User, is_subscribed: bool) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed: Some(is_subscribed),
        }
    }

    /// Resolve an optional author reference, substituting the placeholder.
    pub fn resolve(author: Option<&User>, is_subscribed: bool) -> Self {
        match author {
            Some(user) => Self::from_user(user, is_subscribed),
            None => Self::anonymous(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RecipeView {
    pub id: RecipeId,
    pub tags: Vec<Tag>,
    pub author: AuthorView,
    pub ingredients: Vec<IngredientAmount>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Compact form used in list responses and subscription listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ShortRecipeView {
    pub id: RecipeId,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl From<&RecipeRecord> for ShortRecipeView {
    fn from(recipe: &RecipeRecord) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            image: image_or_placeholder(recipe.image.as_deref()),
            cooking_time: recipe.cooking_time,
        }
    }
}

pub fn image_or_placeholder(image: Option<&str>) -> String {
    image.unwrap_or(MISSING_IMAGE).to_string()
}

pub fn project_recipe<S>(
    store: &S,
    recipe: RecipeRecord,
    viewer: Option<UserId>,
) -> Result<RecipeView, DomainError>
where
    S: RecipeStore + UserStore + ListStore + SubscriptionStore + ?Sized,
{
    let mut views = project_recipes(store, vec![recipe], viewer)?;
    views
        .pop()
        .ok_or(DomainError::NotFound { entity: "recipe" })
}

/// Project a page of recipes, keeping their order.
pub fn project_recipes<S>(
    store: &S,
    recipes: Vec<RecipeRecord>,
    viewer: Option<UserId>,
) -> Result<Vec<RecipeView>, DomainError>
where
    S: RecipeStore + UserStore + ListStore + SubscriptionStore + ?Sized,
{
    if recipes.is_empty() {
        return Ok(Vec::new());
    }

    let recipe_ids: Vec<RecipeId> = recipes.iter().map(|r| r.id).collect();
    let mut author_ids: Vec<UserId> = recipes.iter().filter_map(|r| r.author_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();

    let mut tags = group_by_recipe(store.tags_for_recipes(&recipe_ids)?);
    let mut ingredients = group_by_recipe(store.ingredients_for_recipes(&recipe_ids)?);
    let authors: HashMap<UserId, User> = store
        .users_by_ids(&author_ids)?
        .into_iter()
        .map(|user| (user.id, user))
        .collect();

    let (favorited, in_cart, subscribed) = match viewer {
        Some(viewer) => (
            store.listed_among(RecipeList::Favorites, viewer, &recipe_ids)?,
            store.listed_among(RecipeList::ShoppingCart, viewer, &recipe_ids)?,
            store.subscribed_among(viewer, &author_ids)?,
        ),
        None => (HashSet::new(), HashSet::new(), HashSet::new()),
    };

    Ok(recipes
        .into_iter()
        .map(|recipe| {
            let author = recipe.author_id.and_then(|id| authors.get(&id));
            let is_subscribed = match (viewer, author) {
                (Some(viewer), Some(author)) if viewer != author.id => {
                    subscribed.contains(&author.id)
                }
                _ => false,
            };

            RecipeView {
                id: recipe.id,
                tags: tags.remove(&recipe.id).unwrap_or_default(),
                author: AuthorView::resolve(author, is_subscribed),
                ingredients: ingredients.remove(&recipe.id).unwrap_or_default(),
                is_favorited: favorited.contains(&recipe.id),
                is_in_shopping_cart: in_cart.contains(&recipe.id),
                image: image_or_placeholder(recipe.image.as_deref()),
                name: recipe.name,
                text: recipe.text,
                cooking_time: recipe.cooking_time,
            }
        })
        .collect())
}

/// Project users for a viewer with one subscription lookup for the batch.
/// `is_subscribed` is false for anonymous viewers and for the viewer's own entry.
pub fn project_users<S>(
    store: &S,
    users: &[User],
    viewer: Option<UserId>,
) -> Result<Vec<AuthorView>, DomainError>
where
    S: SubscriptionStore + ?Sized,
{
    let subscribed = match viewer {
        Some(viewer) if !users.is_empty() => {
            let ids: Vec<UserId> = users.iter().map(|u| u.id).collect();
            store.subscribed_among(viewer, &ids)?
        }
        _ => HashSet::new(),
    };

    Ok(users
        .iter()
        .map(|user| {
            let is_subscribed = viewer != Some(user.id) && subscribed.contains(&user.id);
            AuthorView::from_user(user, is_subscribed)
        })
        .collect())
}

fn group_by_recipe<T>(rows: Vec<(RecipeId, T)>) -> HashMap<RecipeId, Vec<T>> {
    let mut grouped: HashMap<RecipeId, Vec<T>> = HashMap::new();
    for (recipe_id, item) in rows {
        grouped.entry(recipe_id).or_default().push(item);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_anonymous_placeholder_shape() {
        let value = serde_json::to_value(AuthorView::anonymous()).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 0,
                "username": "AnonymousUser",
                "email": "",
                "first_name": "",
                "last_name": ""
            })
        );
    }

    #[test]
    fn test_resolve_known_author() {
        let user = User {
            id: 4,
            email: "chef@example.com".to_string(),
            username: "chef".to_string(),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            is_admin: false,
        };
        let view = AuthorView::resolve(Some(&user), true);
        assert_eq!(view.id, 4);
        assert_eq!(view.is_subscribed, Some(true));
    }

    #[test]
    fn test_image_placeholder() {
        assert_eq!(image_or_placeholder(None), MISSING_IMAGE);
        assert_eq!(image_or_placeholder(Some("data:x")), "data:x");
    }

    #[test]
    fn test_group_by_recipe_keeps_row_order() {
        let grouped = group_by_recipe(vec![(1, "a"), (2, "b"), (1, "c")]);
        assert_eq!(grouped[&1], vec!["a", "c"]);
        assert_eq!(grouped[&2], vec!["b"]);
    }
}
