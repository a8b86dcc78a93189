//! Following other authors.

use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::DomainError;
use crate::projection::ShortRecipeView;
use crate::store::{RecipeStore, SubscriptionStore, UserStore};
use crate::types::{Page, PageRequest, RecipeRecord, User, UserId};

/// An author as seen by one of their subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SubscriptionView {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    /// Newest first, capped by `recipes_limit`
    pub recipes: Vec<ShortRecipeView>,
    /// Total number of the author's recipes, ignoring the cap
    pub recipes_count: usize,
}

pub fn subscribe<S>(
    store: &S,
    user: UserId,
    author_id: UserId,
    recipes_limit: Option<usize>,
) -> Result<SubscriptionView, DomainError>
where
    S: UserStore + SubscriptionStore + RecipeStore + ?Sized,
{
    if user == author_id {
        return Err(DomainError::SelfReference);
    }
    let author = store
        .user_by_id(author_id)?
        .ok_or(DomainError::NotFound { entity: "author" })?;

    store.insert_subscription(user, author_id)?;
    tracing::info!(user_id = user, author_id, "subscribed");

    let recipes = store.recipes_by_authors(&[author_id])?;
    let mut views = build_views(vec![author], recipes, recipes_limit);
    views
        .pop()
        .ok_or(DomainError::NotFound { entity: "author" })
}

pub fn unsubscribe<S>(store: &S, user: UserId, author_id: UserId) -> Result<(), DomainError>
where
    S: UserStore + SubscriptionStore + ?Sized,
{
    if store.user_by_id(author_id)?.is_none() {
        return Err(DomainError::NotFound { entity: "author" });
    }
    if !store.delete_subscription(user, author_id)? {
        return Err(DomainError::NotFound {
            entity: "subscription",
        });
    }
    tracing::info!(user_id = user, author_id, "unsubscribed");
    Ok(())
}

pub fn list_subscriptions<S>(
    store: &S,
    user: UserId,
    recipes_limit: Option<usize>,
    page: PageRequest,
) -> Result<Page<SubscriptionView>, DomainError>
where
    S: SubscriptionStore + RecipeStore + ?Sized,
{
    let authors = store.subscribed_authors(user, page)?;
    let author_ids: Vec<UserId> = authors.items.iter().map(|a| a.id).collect();
    let recipes = if author_ids.is_empty() {
        Vec::new()
    } else {
        store.recipes_by_authors(&author_ids)?
    };

    Ok(Page {
        items: build_views(authors.items, recipes, recipes_limit),
        total: authors.total,
    })
}

fn build_views(
    authors: Vec<User>,
    recipes: Vec<RecipeRecord>,
    recipes_limit: Option<usize>,
) -> Vec<SubscriptionView> {
    let mut by_author: HashMap<UserId, Vec<RecipeRecord>> = HashMap::new();
    for recipe in recipes {
        if let Some(author_id) = recipe.author_id {
            by_author.entry(author_id).or_default().push(recipe);
        }
    }

    authors
        .into_iter()
        .map(|author| {
            let recipes = by_author.remove(&author.id).unwrap_or_default();
            let recipes_count = recipes.len();
            let limit = recipes_limit.unwrap_or(recipes_count);
            SubscriptionView {
                id: author.id,
                username: author.username,
                email: author.email,
                first_name: author.first_name,
                last_name: author.last_name,
                is_subscribed: true,
                recipes: recipes.iter().take(limit).map(ShortRecipeView::from).collect(),
                recipes_count,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn author(id: UserId) -> User {
        User {
            id,
            email: format!("{id}@example.com"),
            username: format!("author{id}"),
            first_name: String::new(),
            last_name: String::new(),
            is_admin: false,
        }
    }

    fn recipe(id: i32, author_id: UserId) -> RecipeRecord {
        RecipeRecord {
            id,
            author_id: Some(author_id),
            name: format!("recipe {id}"),
            image: None,
            text: "text".to_string(),
            cooking_time: 5,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_build_views_caps_recipes_but_counts_all() {
        let views = build_views(
            vec![author(1), author(2)],
            vec![recipe(10, 1), recipe(11, 1), recipe(12, 1), recipe(20, 2)],
            Some(2),
        );
        assert_eq!(views[0].recipes.len(), 2);
        assert_eq!(views[0].recipes_count, 3);
        assert_eq!(views[0].recipes[0].id, 10);
        assert_eq!(views[1].recipes_count, 1);
        assert!(views.iter().all(|v| v.is_subscribed));
    }

    #[test]
    fn test_build_views_without_limit() {
        let views = build_views(vec![author(1)], vec![recipe(10, 1), recipe(11, 1)], None);
        assert_eq!(views[0].recipes.len(), 2);
    }

    #[test]
    fn test_build_views_zero_limit() {
        let views = build_views(vec![author(1)], vec![recipe(10, 1)], Some(0));
        assert!(views[0].recipes.is_empty());
        assert_eq!(views[0].recipes_count, 1);
    }
}
