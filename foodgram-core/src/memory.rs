//! In-memory store for tests.
//!
//! Behaves like the PostgreSQL schema: unique keys, the self-subscription
//! check, cascades and SET NULL on author deletion. A unit of work runs
//! against a copy of the state while holding the lock, and the copy replaces
//! the state only when the closure succeeds.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use crate::catalog::{name_has_prefix, CatalogStore};
use crate::error::DomainError;
use crate::lists::already_listed;
use crate::store::{
    ListStore, RecipeFilter, RecipeStore, SubscriptionStore, UnitOfWork, UserStore,
};
use crate::types::{
    Ingredient, IngredientAmount, IngredientId, Page, PageRequest, RecipeFieldChanges,
    RecipeFields, RecipeId, RecipeList, RecipeRecord, ResolvedIngredient, Tag, TagId, User,
    UserId,
};

#[derive(Debug, Clone, Default)]
struct State {
    users: BTreeMap<UserId, User>,
    tags: BTreeMap<TagId, Tag>,
    ingredients: BTreeMap<IngredientId, Ingredient>,
    recipes: BTreeMap<RecipeId, RecipeRecord>,
    recipe_tags: Vec<(RecipeId, TagId)>,
    recipe_ingredients: Vec<(RecipeId, IngredientId, i32)>,
    favorites: Vec<(UserId, RecipeId)>,
    shopping_cart: Vec<(UserId, RecipeId)>,
    subscriptions: Vec<(UserId, UserId)>,
    last_recipe_id: RecipeId,
}

impl State {
    fn list(&self, list: RecipeList) -> &Vec<(UserId, RecipeId)> {
        match list {
            RecipeList::Favorites => &self.favorites,
            RecipeList::ShoppingCart => &self.shopping_cart,
        }
    }

    fn list_mut(&mut self, list: RecipeList) -> &mut Vec<(UserId, RecipeId)> {
        match list {
            RecipeList::Favorites => &mut self.favorites,
            RecipeList::ShoppingCart => &mut self.shopping_cart,
        }
    }

    fn name_taken(&self, author: UserId, name: &str, except: Option<RecipeId>) -> bool {
        self.recipes.values().any(|recipe| {
            recipe.author_id == Some(author) && recipe.name == name && Some(recipe.id) != except
        })
    }
}

fn duplicate_recipe_name() -> DomainError {
    DomainError::conflict("name", "You have already published a recipe with this name")
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    operations: AtomicUsize,
    fail_ingredient_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: User) {
        self.seed().users.insert(user.id, user);
    }

    pub fn add_tag(&self, tag: Tag) {
        self.seed().tags.insert(tag.id, tag);
    }

    pub fn add_ingredient(&self, ingredient: Ingredient) {
        self.seed().ingredients.insert(ingredient.id, ingredient);
    }

    /// Delete a user account: their recipes lose the author, their lists and
    /// subscriptions go away.
    pub fn remove_user(&self, id: UserId) {
        let mut state = self.seed();
        state.users.remove(&id);
        for recipe in state.recipes.values_mut() {
            if recipe.author_id == Some(id) {
                recipe.author_id = None;
            }
        }
        state.favorites.retain(|(user, _)| *user != id);
        state.shopping_cart.retain(|(user, _)| *user != id);
        state
            .subscriptions
            .retain(|(user, author)| *user != id && *author != id);
    }

    /// Delete a catalog ingredient along with every recipe row using it.
    pub fn remove_ingredient(&self, id: IngredientId) {
        let mut state = self.seed();
        state.ingredients.remove(&id);
        state
            .recipe_ingredients
            .retain(|(_, ingredient, _)| *ingredient != id);
    }

    /// Make every following ingredient replacement fail, to exercise rollback.
    pub fn fail_ingredient_writes(&self, fail: bool) {
        self.fail_ingredient_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of store calls made so far (seeding excluded).
    pub fn operation_count(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    /// Raw `(recipe, ingredient, amount)` rows, for checking orphan rows.
    pub fn ingredient_rows(&self) -> Vec<(RecipeId, IngredientId, i32)> {
        self.seed().recipe_ingredients.clone()
    }

    fn seed(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        self.seed()
    }
}

struct MemoryUnitOfWork<'a> {
    state: &'a mut State,
    fail_ingredient_writes: bool,
}

impl UnitOfWork for MemoryUnitOfWork<'_> {
    fn insert_recipe(
        &mut self,
        author: UserId,
        fields: &RecipeFields,
    ) -> Result<RecipeId, DomainError> {
        if !self.state.users.contains_key(&author) {
            return Err(DomainError::NotFound { entity: "author" });
        }
        if self.state.name_taken(author, &fields.name, None) {
            return Err(duplicate_recipe_name());
        }

        self.state.last_recipe_id += 1;
        let id = self.state.last_recipe_id;
        self.state.recipes.insert(
            id,
            RecipeRecord {
                id,
                author_id: Some(author),
                name: fields.name.clone(),
                image: Some(fields.image.clone()),
                text: fields.text.clone(),
                cooking_time: fields.cooking_time,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    fn update_recipe(
        &mut self,
        recipe: RecipeId,
        changes: &RecipeFieldChanges,
    ) -> Result<(), DomainError> {
        let author = match self.state.recipes.get(&recipe) {
            Some(existing) => existing.author_id,
            None => return Err(DomainError::NotFound { entity: "recipe" }),
        };
        if let (Some(author), Some(name)) = (author, &changes.name) {
            if self.state.name_taken(author, name, Some(recipe)) {
                return Err(duplicate_recipe_name());
            }
        }

        let Some(existing) = self.state.recipes.get_mut(&recipe) else {
            return Err(DomainError::NotFound { entity: "recipe" });
        };
        if let Some(name) = &changes.name {
            existing.name = name.clone();
        }
        if let Some(image) = &changes.image {
            existing.image = Some(image.clone());
        }
        if let Some(text) = &changes.text {
            existing.text = text.clone();
        }
        if let Some(cooking_time) = changes.cooking_time {
            existing.cooking_time = cooking_time;
        }
        Ok(())
    }

    fn replace_tags(&mut self, recipe: RecipeId, tags: &[TagId]) -> Result<(), DomainError> {
        if !self.state.recipes.contains_key(&recipe) {
            return Err(DomainError::NotFound { entity: "recipe" });
        }
        let unknown: Vec<TagId> = tags
            .iter()
            .copied()
            .filter(|id| !self.state.tags.contains_key(id))
            .collect();
        if !unknown.is_empty() {
            return Err(DomainError::UnknownReference {
                field: "tags",
                ids: unknown,
            });
        }

        self.state.recipe_tags.retain(|(r, _)| *r != recipe);
        let mut seen = HashSet::new();
        for &tag in tags {
            if !seen.insert(tag) {
                return Err(DomainError::conflict("tags", "Tag linked twice"));
            }
            self.state.recipe_tags.push((recipe, tag));
        }
        Ok(())
    }

    fn replace_ingredients(
        &mut self,
        recipe: RecipeId,
        ingredients: &[ResolvedIngredient],
    ) -> Result<(), DomainError> {
        if !self.state.recipes.contains_key(&recipe) {
            return Err(DomainError::NotFound { entity: "recipe" });
        }
        self.state.recipe_ingredients.retain(|(r, _, _)| *r != recipe);
        if self.fail_ingredient_writes {
            return Err(DomainError::Storage(
                "injected ingredient write failure".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for item in ingredients {
            let id = item.ingredient.id;
            if !self.state.ingredients.contains_key(&id) {
                return Err(DomainError::UnknownReference {
                    field: "ingredients",
                    ids: vec![id],
                });
            }
            if !seen.insert(id) {
                return Err(DomainError::conflict(
                    "ingredients",
                    "Ingredient listed twice",
                ));
            }
            self.state.recipe_ingredients.push((recipe, id, item.amount));
        }
        Ok(())
    }

    fn delete_recipe(&mut self, recipe: RecipeId) -> Result<bool, DomainError> {
        if self.state.recipes.remove(&recipe).is_none() {
            return Ok(false);
        }
        self.state.recipe_tags.retain(|(r, _)| *r != recipe);
        self.state.recipe_ingredients.retain(|(r, _, _)| *r != recipe);
        self.state.favorites.retain(|(_, r)| *r != recipe);
        self.state.shopping_cart.retain(|(_, r)| *r != recipe);
        Ok(true)
    }
}

impl CatalogStore for MemoryStore {
    fn tags_by_ids(&self, ids: &[TagId]) -> Result<Vec<Tag>, DomainError> {
        let state = self.state();
        Ok(ids
            .iter()
            .filter_map(|id| state.tags.get(id).cloned())
            .collect())
    }

    fn ingredients_by_ids(&self, ids: &[IngredientId]) -> Result<Vec<Ingredient>, DomainError> {
        let state = self.state();
        Ok(ids
            .iter()
            .filter_map(|id| state.ingredients.get(id).cloned())
            .collect())
    }

    fn search_ingredients_by_prefix(&self, prefix: &str) -> Result<Vec<Ingredient>, DomainError> {
        let state = self.state();
        let mut found: Vec<Ingredient> = state
            .ingredients
            .values()
            .filter(|ingredient| name_has_prefix(&ingredient.name, prefix))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            (&a.name, &a.measurement_unit).cmp(&(&b.name, &b.measurement_unit))
        });
        Ok(found)
    }

    fn list_tags(&self) -> Result<Vec<Tag>, DomainError> {
        let state = self.state();
        let mut tags: Vec<Tag> = state.tags.values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }
}

impl RecipeStore for MemoryStore {
    fn transaction<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, DomainError>,
    {
        let mut state = self.state();
        let mut working = state.clone();
        let value = {
            let mut uow = MemoryUnitOfWork {
                state: &mut working,
                fail_ingredient_writes: self.fail_ingredient_writes.load(Ordering::SeqCst),
            };
            f(&mut uow)?
        };
        *state = working;
        Ok(value)
    }

    fn recipe_by_id(&self, id: RecipeId) -> Result<Option<RecipeRecord>, DomainError> {
        Ok(self.state().recipes.get(&id).cloned())
    }

    fn find_recipes(
        &self,
        filter: &RecipeFilter,
        viewer: Option<UserId>,
        page: PageRequest,
    ) -> Result<Page<RecipeRecord>, DomainError> {
        let state = self.state();

        let has_tag = |recipe: RecipeId| {
            state.recipe_tags.iter().any(|(r, tag)| {
                *r == recipe
                    && state
                        .tags
                        .get(tag)
                        .is_some_and(|tag| filter.tags.contains(&tag.slug))
            })
        };
        let flag_matches = |wanted: Option<bool>, list: RecipeList, recipe: RecipeId| {
            match (wanted, viewer) {
                (Some(wanted), Some(viewer)) => {
                    state.list(list).contains(&(viewer, recipe)) == wanted
                }
                _ => true,
            }
        };

        let mut matching: Vec<&RecipeRecord> = state
            .recipes
            .values()
            .filter(|recipe| filter.author.is_none() || recipe.author_id == filter.author)
            .filter(|recipe| filter.tags.is_empty() || has_tag(recipe.id))
            .filter(|recipe| flag_matches(filter.is_favorited, RecipeList::Favorites, recipe.id))
            .filter(|recipe| {
                flag_matches(
                    filter.is_in_shopping_cart,
                    RecipeList::ShoppingCart,
                    recipe.id,
                )
            })
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();
        Ok(Page { items, total })
    }

    fn tags_for_recipes(&self, recipes: &[RecipeId]) -> Result<Vec<(RecipeId, Tag)>, DomainError> {
        let state = self.state();
        let mut rows: Vec<(RecipeId, Tag)> = state
            .recipe_tags
            .iter()
            .filter(|(recipe, _)| recipes.contains(recipe))
            .filter_map(|(recipe, tag)| state.tags.get(tag).map(|tag| (*recipe, tag.clone())))
            .collect();
        rows.sort_by(|a, b| a.1.name.cmp(&b.1.name));
        Ok(rows)
    }

    fn ingredients_for_recipes(
        &self,
        recipes: &[RecipeId],
    ) -> Result<Vec<(RecipeId, IngredientAmount)>, DomainError> {
        let state = self.state();
        let mut rows: Vec<(RecipeId, IngredientAmount)> = state
            .recipe_ingredients
            .iter()
            .filter(|(recipe, _, _)| recipes.contains(recipe))
            .filter_map(|(recipe, ingredient, amount)| {
                state.ingredients.get(ingredient).map(|ingredient| {
                    (
                        *recipe,
                        IngredientAmount {
                            id: ingredient.id,
                            name: ingredient.name.clone(),
                            measurement_unit: ingredient.measurement_unit.clone(),
                            amount: *amount,
                        },
                    )
                })
            })
            .collect();
        rows.sort_by(|a, b| a.1.name.cmp(&b.1.name));
        Ok(rows)
    }

    fn recipes_by_authors(&self, authors: &[UserId]) -> Result<Vec<RecipeRecord>, DomainError> {
        let state = self.state();
        let mut recipes: Vec<RecipeRecord> = state
            .recipes
            .values()
            .filter(|recipe| recipe.author_id.is_some_and(|a| authors.contains(&a)))
            .cloned()
            .collect();
        recipes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(recipes)
    }
}

impl UserStore for MemoryStore {
    fn users_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, DomainError> {
        let state = self.state();
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id).cloned())
            .collect())
    }

    fn list_users(&self, page: PageRequest) -> Result<Page<User>, DomainError> {
        let state = self.state();
        let items = state
            .users
            .values()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();
        Ok(Page {
            items,
            total: state.users.len() as i64,
        })
    }
}

impl ListStore for MemoryStore {
    fn listed_among(
        &self,
        list: RecipeList,
        user: UserId,
        recipes: &[RecipeId],
    ) -> Result<HashSet<RecipeId>, DomainError> {
        let state = self.state();
        Ok(state
            .list(list)
            .iter()
            .filter(|(u, recipe)| *u == user && recipes.contains(recipe))
            .map(|(_, recipe)| *recipe)
            .collect())
    }

    fn add_to_list(
        &self,
        list: RecipeList,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<(), DomainError> {
        let mut state = self.state();
        if !state.recipes.contains_key(&recipe) {
            return Err(DomainError::NotFound { entity: "recipe" });
        }
        if state.list(list).contains(&(user, recipe)) {
            return Err(already_listed(list));
        }
        state.list_mut(list).push((user, recipe));
        Ok(())
    }

    fn remove_from_list(
        &self,
        list: RecipeList,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<bool, DomainError> {
        let mut state = self.state();
        let entries = state.list_mut(list);
        let before = entries.len();
        entries.retain(|entry| *entry != (user, recipe));
        Ok(entries.len() != before)
    }

    fn has_entries(&self, list: RecipeList, user: UserId) -> Result<bool, DomainError> {
        let state = self.state();
        Ok(state.list(list).iter().any(|(u, _)| *u == user))
    }

    fn cart_ingredient_rows(&self, user: UserId) -> Result<Vec<(Ingredient, i32)>, DomainError> {
        let state = self.state();
        let mut rows = Vec::new();
        for (_, recipe) in state.shopping_cart.iter().filter(|(u, _)| *u == user) {
            for (_, ingredient, amount) in state
                .recipe_ingredients
                .iter()
                .filter(|(r, _, _)| r == recipe)
            {
                if let Some(ingredient) = state.ingredients.get(ingredient) {
                    rows.push((ingredient.clone(), *amount));
                }
            }
        }
        Ok(rows)
    }
}

impl SubscriptionStore for MemoryStore {
    fn subscribed_among(
        &self,
        user: UserId,
        authors: &[UserId],
    ) -> Result<HashSet<UserId>, DomainError> {
        let state = self.state();
        Ok(state
            .subscriptions
            .iter()
            .filter(|(u, author)| *u == user && authors.contains(author))
            .map(|(_, author)| *author)
            .collect())
    }

    fn insert_subscription(&self, user: UserId, author: UserId) -> Result<(), DomainError> {
        let mut state = self.state();
        if user == author {
            return Err(DomainError::SelfReference);
        }
        if !state.users.contains_key(&author) {
            return Err(DomainError::NotFound { entity: "author" });
        }
        if state.subscriptions.contains(&(user, author)) {
            return Err(DomainError::conflict(
                "author",
                "You are already subscribed to this user",
            ));
        }
        state.subscriptions.push((user, author));
        Ok(())
    }

    fn delete_subscription(&self, user: UserId, author: UserId) -> Result<bool, DomainError> {
        let mut state = self.state();
        let before = state.subscriptions.len();
        state.subscriptions.retain(|entry| *entry != (user, author));
        Ok(state.subscriptions.len() != before)
    }

    fn subscribed_authors(
        &self,
        user: UserId,
        page: PageRequest,
    ) -> Result<Page<User>, DomainError> {
        let state = self.state();
        let mut authors: Vec<User> = state
            .subscriptions
            .iter()
            .filter(|(u, _)| *u == user)
            .filter_map(|(_, author)| state.users.get(author).cloned())
            .collect();
        authors.sort_by(|a, b| a.username.cmp(&b.username));

        let total = authors.len() as i64;
        let items = authors
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect();
        Ok(Page { items, total })
    }
}
