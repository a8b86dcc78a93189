//! PostgreSQL implementation of the core storage traits.

use std::collections::HashSet;

use diesel::dsl::sql;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::BigInt;
use foodgram_core::{
    escape_like, lists::already_listed, CatalogStore, DomainError, Ingredient, IngredientAmount,
    IngredientId, ListStore, Page, PageRequest, RecipeFieldChanges, RecipeFields, RecipeFilter,
    RecipeId, RecipeList, RecipeRecord, RecipeStore, ResolvedIngredient, SubscriptionStore, Tag,
    TagId, UnitOfWork, User, UserId, UserStore,
};

use crate::db::{DbConn, DbPool};
use crate::models::{
    IngredientRow, NewRecipe, NewRecipeIngredient, NewRecipeTag, NewSubscription,
    RecipeChangeset, RecipeRow, TagRow, UserRow,
};
use crate::schema::{
    favorites, ingredients, recipe_ingredients, recipe_tags, recipes, shopping_cart,
    subscriptions, tags, users,
};

const RECIPE_NAME_CONSTRAINT: &str = "recipes_name_author_unique";
const NO_SELF_SUBSCRIBE_CONSTRAINT: &str = "subscriptions_no_self_subscribe";

fn query_span(query: &'static str) -> tracing::span::EnteredSpan {
    tracing::info_span!("db.query", query).entered()
}

fn storage(e: DieselError) -> DomainError {
    DomainError::Storage(e.to_string())
}

fn is_unique_violation(e: &DieselError) -> bool {
    matches!(
        e,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

fn is_foreign_key_violation(e: &DieselError) -> bool {
    matches!(
        e,
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)
    )
}

fn violated_constraint(e: &DieselError) -> Option<&str> {
    match e {
        DieselError::DatabaseError(_, info) => info.constraint_name(),
        _ => None,
    }
}

fn recipe_write_error(e: DieselError) -> DomainError {
    if is_unique_violation(&e)
        && violated_constraint(&e) == Some(RECIPE_NAME_CONSTRAINT)
    {
        return DomainError::conflict("name", "You have already published a recipe with this name");
    }
    storage(e)
}

/// Error type threaded through diesel's transaction so domain failures can
/// abort it alongside database errors.
#[derive(Debug)]
enum TxError {
    Domain(DomainError),
    Db(DieselError),
}

impl From<DieselError> for TxError {
    fn from(e: DieselError) -> Self {
        TxError::Db(e)
    }
}

impl From<TxError> for DomainError {
    fn from(e: TxError) -> Self {
        match e {
            TxError::Domain(e) => e,
            TxError::Db(e) => storage(e),
        }
    }
}

pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn conn(&self) -> Result<DbConn, DomainError> {
        self.pool
            .get()
            .map_err(|e| DomainError::Storage(format!("Database connection failed: {e}")))
    }

    fn filtered_recipes<'a>(
        filter: &'a RecipeFilter,
        viewer: Option<UserId>,
    ) -> recipes::BoxedQuery<'a, Pg> {
        let mut query = recipes::table.into_boxed();

        if let Some(author) = filter.author {
            query = query.filter(recipes::author_id.eq(author));
        }

        // Any of the requested slugs matches
        if !filter.tags.is_empty() {
            query = query.filter(
                recipes::id.eq_any(
                    recipe_tags::table
                        .inner_join(tags::table)
                        .filter(tags::slug.eq_any(filter.tags.clone()))
                        .select(recipe_tags::recipe_id),
                ),
            );
        }

        if let Some(viewer) = viewer {
            let favorited = favorites::table
                .filter(favorites::user_id.eq(viewer))
                .select(favorites::recipe_id);
            match filter.is_favorited {
                Some(true) => query = query.filter(recipes::id.eq_any(favorited)),
                Some(false) => query = query.filter(recipes::id.ne_all(favorited)),
                None => {}
            }

            let in_cart = shopping_cart::table
                .filter(shopping_cart::user_id.eq(viewer))
                .select(shopping_cart::recipe_id);
            match filter.is_in_shopping_cart {
                Some(true) => query = query.filter(recipes::id.eq_any(in_cart)),
                Some(false) => query = query.filter(recipes::id.ne_all(in_cart)),
                None => {}
            }
        }

        query
    }
}

struct PgUnitOfWork<'c> {
    conn: &'c mut PgConnection,
}

impl UnitOfWork for PgUnitOfWork<'_> {
    fn insert_recipe(
        &mut self,
        author: UserId,
        fields: &RecipeFields,
    ) -> Result<RecipeId, DomainError> {
        let _span = query_span("insert_recipe");
        diesel::insert_into(recipes::table)
            .values(&NewRecipe {
                author_id: Some(author),
                name: &fields.name,
                image: Some(&fields.image),
                text: &fields.text,
                cooking_time: fields.cooking_time,
            })
            .returning(recipes::id)
            .get_result(self.conn)
            .map_err(recipe_write_error)
    }

    fn update_recipe(
        &mut self,
        recipe: RecipeId,
        changes: &RecipeFieldChanges,
    ) -> Result<(), DomainError> {
        let _span = query_span("update_recipe");
        let found = if changes.is_empty() {
            recipes::table
                .find(recipe)
                .select(recipes::id)
                .first::<i32>(self.conn)
                .optional()
                .map_err(storage)?
                .is_some()
        } else {
            diesel::update(recipes::table.find(recipe))
                .set(&RecipeChangeset {
                    name: changes.name.as_deref(),
                    image: changes.image.as_deref(),
                    text: changes.text.as_deref(),
                    cooking_time: changes.cooking_time,
                })
                .execute(self.conn)
                .map_err(recipe_write_error)?
                > 0
        };

        if !found {
            return Err(DomainError::NotFound { entity: "recipe" });
        }
        Ok(())
    }

    fn replace_tags(&mut self, recipe: RecipeId, tag_ids: &[TagId]) -> Result<(), DomainError> {
        let _span = query_span("replace_tags");
        diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe)))
            .execute(self.conn)
            .map_err(storage)?;

        let rows: Vec<NewRecipeTag> = tag_ids
            .iter()
            .map(|&tag_id| NewRecipeTag {
                recipe_id: recipe,
                tag_id,
            })
            .collect();
        diesel::insert_into(recipe_tags::table)
            .values(&rows)
            .execute(self.conn)
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    DomainError::UnknownReference {
                        field: "tags",
                        ids: tag_ids.to_vec(),
                    }
                } else {
                    storage(e)
                }
            })?;
        Ok(())
    }

    fn replace_ingredients(
        &mut self,
        recipe: RecipeId,
        items: &[ResolvedIngredient],
    ) -> Result<(), DomainError> {
        let _span = query_span("replace_ingredients");
        diesel::delete(recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe)))
            .execute(self.conn)
            .map_err(storage)?;

        let rows: Vec<NewRecipeIngredient> = items
            .iter()
            .map(|item| NewRecipeIngredient {
                recipe_id: recipe,
                ingredient_id: item.ingredient.id,
                amount: item.amount,
            })
            .collect();
        diesel::insert_into(recipe_ingredients::table)
            .values(&rows)
            .execute(self.conn)
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    DomainError::UnknownReference {
                        field: "ingredients",
                        ids: items.iter().map(|i| i.ingredient.id).collect(),
                    }
                } else {
                    storage(e)
                }
            })?;
        Ok(())
    }

    fn delete_recipe(&mut self, recipe: RecipeId) -> Result<bool, DomainError> {
        let _span = query_span("delete_recipe");
        let deleted = diesel::delete(recipes::table.find(recipe))
            .execute(self.conn)
            .map_err(storage)?;
        Ok(deleted > 0)
    }
}

impl CatalogStore for PgStore {
    fn tags_by_ids(&self, ids: &[TagId]) -> Result<Vec<Tag>, DomainError> {
        let mut conn = self.conn()?;
        let _span = query_span("tags_by_ids");
        let rows: Vec<TagRow> = tags::table
            .filter(tags::id.eq_any(ids.to_vec()))
            .select(TagRow::as_select())
            .load(&mut conn)
            .map_err(storage)?;
        Ok(rows.into_iter().map(Tag::from).collect())
    }

    fn ingredients_by_ids(&self, ids: &[IngredientId]) -> Result<Vec<Ingredient>, DomainError> {
        let mut conn = self.conn()?;
        let _span = query_span("ingredients_by_ids");
        let rows: Vec<IngredientRow> = ingredients::table
            .filter(ingredients::id.eq_any(ids.to_vec()))
            .select(IngredientRow::as_select())
            .load(&mut conn)
            .map_err(storage)?;
        Ok(rows.into_iter().map(Ingredient::from).collect())
    }

    fn search_ingredients_by_prefix(&self, prefix: &str) -> Result<Vec<Ingredient>, DomainError> {
        let pattern = format!("{}%", escape_like(prefix));
        let mut conn = self.conn()?;
        let _span = query_span("search_ingredients_by_prefix");
        let rows: Vec<IngredientRow> = ingredients::table
            .filter(ingredients::name.ilike(&pattern))
            .order((ingredients::name.asc(), ingredients::measurement_unit.asc()))
            .select(IngredientRow::as_select())
            .load(&mut conn)
            .map_err(storage)?;
        Ok(rows.into_iter().map(Ingredient::from).collect())
    }

    fn list_tags(&self) -> Result<Vec<Tag>, DomainError> {
        let mut conn = self.conn()?;
        let _span = query_span("list_tags");
        let rows: Vec<TagRow> = tags::table
            .order(tags::name.asc())
            .select(TagRow::as_select())
            .load(&mut conn)
            .map_err(storage)?;
        Ok(rows.into_iter().map(Tag::from).collect())
    }
}

impl RecipeStore for PgStore {
    fn transaction<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, DomainError>,
    {
        let mut pooled = self.conn()?;
        let conn: &mut PgConnection = &mut pooled;
        conn.transaction::<T, TxError, _>(|conn| {
            let mut uow = PgUnitOfWork { conn };
            f(&mut uow).map_err(TxError::Domain)
        })
        .map_err(DomainError::from)
    }

    fn recipe_by_id(&self, id: RecipeId) -> Result<Option<RecipeRecord>, DomainError> {
        let mut conn = self.conn()?;
        let _span = query_span("recipe_by_id");
        let row: Option<RecipeRow> = recipes::table
            .find(id)
            .select(RecipeRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(storage)?;
        Ok(row.map(RecipeRecord::from))
    }

    fn find_recipes(
        &self,
        filter: &RecipeFilter,
        viewer: Option<UserId>,
        page: PageRequest,
    ) -> Result<Page<RecipeRecord>, DomainError> {
        let mut conn = self.conn()?;
        let _span = query_span("find_recipes");

        // COUNT(*) OVER() computes the total across all matching rows
        let rows: Vec<(RecipeRow, i64)> = Self::filtered_recipes(filter, viewer)
            .order((recipes::created_at.desc(), recipes::id.desc()))
            .select((RecipeRow::as_select(), sql::<BigInt>("COUNT(*) OVER()")))
            .limit(page.limit)
            .offset(page.offset)
            .load(&mut conn)
            .map_err(storage)?;

        let total = match rows.first() {
            Some((_, total)) => *total,
            // Past the last page the window count is unavailable
            None if page.offset > 0 => Self::filtered_recipes(filter, viewer)
                .count()
                .get_result(&mut conn)
                .map_err(storage)?,
            None => 0,
        };

        Ok(Page {
            items: rows.into_iter().map(|(row, _)| row.into()).collect(),
            total,
        })
    }

    fn tags_for_recipes(&self, ids: &[RecipeId]) -> Result<Vec<(RecipeId, Tag)>, DomainError> {
        let mut conn = self.conn()?;
        let _span = query_span("tags_for_recipes");
        let rows: Vec<(i32, TagRow)> = recipe_tags::table
            .inner_join(tags::table)
            .filter(recipe_tags::recipe_id.eq_any(ids.to_vec()))
            .order(tags::name.asc())
            .select((recipe_tags::recipe_id, TagRow::as_select()))
            .load(&mut conn)
            .map_err(storage)?;
        Ok(rows
            .into_iter()
            .map(|(recipe_id, tag)| (recipe_id, tag.into()))
            .collect())
    }

    fn ingredients_for_recipes(
        &self,
        ids: &[RecipeId],
    ) -> Result<Vec<(RecipeId, IngredientAmount)>, DomainError> {
        let mut conn = self.conn()?;
        let _span = query_span("ingredients_for_recipes");
        let rows: Vec<(i32, IngredientRow, i32)> = recipe_ingredients::table
            .inner_join(ingredients::table)
            .filter(recipe_ingredients::recipe_id.eq_any(ids.to_vec()))
            .order(ingredients::name.asc())
            .select((
                recipe_ingredients::recipe_id,
                IngredientRow::as_select(),
                recipe_ingredients::amount,
            ))
            .load(&mut conn)
            .map_err(storage)?;
        Ok(rows
            .into_iter()
            .map(|(recipe_id, ingredient, amount)| {
                (
                    recipe_id,
                    IngredientAmount {
                        id: ingredient.id,
                        name: ingredient.name,
                        measurement_unit: ingredient.measurement_unit,
                        amount,
                    },
                )
            })
            .collect())
    }

    fn recipes_by_authors(&self, authors: &[UserId]) -> Result<Vec<RecipeRecord>, DomainError> {
        let mut conn = self.conn()?;
        let _span = query_span("recipes_by_authors");
        let rows: Vec<RecipeRow> = recipes::table
            .filter(recipes::author_id.eq_any(authors.to_vec()))
            .order((recipes::created_at.desc(), recipes::id.desc()))
            .select(RecipeRow::as_select())
            .load(&mut conn)
            .map_err(storage)?;
        Ok(rows.into_iter().map(RecipeRecord::from).collect())
    }
}

impl UserStore for PgStore {
    fn users_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, DomainError> {
        let mut conn = self.conn()?;
        let _span = query_span("users_by_ids");
        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(ids.to_vec()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .map_err(storage)?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    fn list_users(&self, page: PageRequest) -> Result<Page<User>, DomainError> {
        let mut conn = self.conn()?;
        let _span = query_span("list_users");
        let rows: Vec<(UserRow, i64)> = users::table
            .order(users::id.asc())
            .select((UserRow::as_select(), sql::<BigInt>("COUNT(*) OVER()")))
            .limit(page.limit)
            .offset(page.offset)
            .load(&mut conn)
            .map_err(storage)?;

        let total = match rows.first() {
            Some((_, total)) => *total,
            None if page.offset > 0 => users::table
                .count()
                .get_result(&mut conn)
                .map_err(storage)?,
            None => 0,
        };

        Ok(Page {
            items: rows.into_iter().map(|(row, _)| row.into()).collect(),
            total,
        })
    }
}

impl ListStore for PgStore {
    fn listed_among(
        &self,
        list: RecipeList,
        user: UserId,
        recipes: &[RecipeId],
    ) -> Result<HashSet<RecipeId>, DomainError> {
        let mut conn = self.conn()?;
        let _span = query_span("listed_among");
        let ids: Vec<i32> = match list {
            RecipeList::Favorites => favorites::table
                .filter(favorites::user_id.eq(user))
                .filter(favorites::recipe_id.eq_any(recipes.to_vec()))
                .select(favorites::recipe_id)
                .load(&mut conn),
            RecipeList::ShoppingCart => shopping_cart::table
                .filter(shopping_cart::user_id.eq(user))
                .filter(shopping_cart::recipe_id.eq_any(recipes.to_vec()))
                .select(shopping_cart::recipe_id)
                .load(&mut conn),
        }
        .map_err(storage)?;
        Ok(ids.into_iter().collect())
    }

    fn add_to_list(
        &self,
        list: RecipeList,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<(), DomainError> {
        let mut conn = self.conn()?;
        let _span = query_span("add_to_list");
        let inserted = match list {
            RecipeList::Favorites => diesel::insert_into(favorites::table)
                .values((favorites::user_id.eq(user), favorites::recipe_id.eq(recipe)))
                .execute(&mut conn),
            RecipeList::ShoppingCart => diesel::insert_into(shopping_cart::table)
                .values((
                    shopping_cart::user_id.eq(user),
                    shopping_cart::recipe_id.eq(recipe),
                ))
                .execute(&mut conn),
        };

        match inserted {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                Err(already_listed(list))
            }
            Err(e) if is_foreign_key_violation(&e) => {
                Err(DomainError::NotFound { entity: "recipe" })
            }
            Err(e) => Err(storage(e)),
        }
    }

    fn remove_from_list(
        &self,
        list: RecipeList,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<bool, DomainError> {
        let mut conn = self.conn()?;
        let _span = query_span("remove_from_list");
        let deleted = match list {
            RecipeList::Favorites => diesel::delete(
                favorites::table
                    .filter(favorites::user_id.eq(user))
                    .filter(favorites::recipe_id.eq(recipe)),
            )
            .execute(&mut conn),
            RecipeList::ShoppingCart => diesel::delete(
                shopping_cart::table
                    .filter(shopping_cart::user_id.eq(user))
                    .filter(shopping_cart::recipe_id.eq(recipe)),
            )
            .execute(&mut conn),
        }
        .map_err(storage)?;
        Ok(deleted > 0)
    }

    fn has_entries(&self, list: RecipeList, user: UserId) -> Result<bool, DomainError> {
        let mut conn = self.conn()?;
        let _span = query_span("has_entries");
        match list {
            RecipeList::Favorites => diesel::select(diesel::dsl::exists(
                favorites::table.filter(favorites::user_id.eq(user)),
            ))
            .get_result(&mut conn),
            RecipeList::ShoppingCart => diesel::select(diesel::dsl::exists(
                shopping_cart::table.filter(shopping_cart::user_id.eq(user)),
            ))
            .get_result(&mut conn),
        }
        .map_err(storage)
    }

    fn cart_ingredient_rows(&self, user: UserId) -> Result<Vec<(Ingredient, i32)>, DomainError> {
        let mut conn = self.conn()?;
        let _span = query_span("cart_ingredient_rows");
        let rows: Vec<(IngredientRow, i32)> = recipe_ingredients::table
            .inner_join(ingredients::table)
            .inner_join(
                shopping_cart::table.on(shopping_cart::recipe_id.eq(recipe_ingredients::recipe_id)),
            )
            .filter(shopping_cart::user_id.eq(user))
            .order((
                shopping_cart::created_at.asc(),
                recipe_ingredients::recipe_id.asc(),
                ingredients::name.asc(),
            ))
            .select((IngredientRow::as_select(), recipe_ingredients::amount))
            .load(&mut conn)
            .map_err(storage)?;
        Ok(rows
            .into_iter()
            .map(|(ingredient, amount)| (ingredient.into(), amount))
            .collect())
    }
}

impl SubscriptionStore for PgStore {
    fn subscribed_among(
        &self,
        user: UserId,
        authors: &[UserId],
    ) -> Result<HashSet<UserId>, DomainError> {
        let mut conn = self.conn()?;
        let _span = query_span("subscribed_among");
        let ids: Vec<i32> = subscriptions::table
            .filter(subscriptions::user_id.eq(user))
            .filter(subscriptions::author_id.eq_any(authors.to_vec()))
            .select(subscriptions::author_id)
            .load(&mut conn)
            .map_err(storage)?;
        Ok(ids.into_iter().collect())
    }

    fn insert_subscription(&self, user: UserId, author: UserId) -> Result<(), DomainError> {
        let mut conn = self.conn()?;
        let _span = query_span("insert_subscription");
        let inserted = diesel::insert_into(subscriptions::table)
            .values(&NewSubscription {
                user_id: user,
                author_id: author,
            })
            .execute(&mut conn);

        match inserted {
            Ok(_) => Ok(()),
            Err(e) if violated_constraint(&e) == Some(NO_SELF_SUBSCRIBE_CONSTRAINT) => {
                Err(DomainError::SelfReference)
            }
            Err(e) if is_unique_violation(&e) => Err(
                DomainError::conflict("author", "You are already subscribed to this user"),
            ),
            Err(e) if is_foreign_key_violation(&e) => {
                Err(DomainError::NotFound { entity: "author" })
            }
            Err(e) => Err(storage(e)),
        }
    }

    fn delete_subscription(&self, user: UserId, author: UserId) -> Result<bool, DomainError> {
        let mut conn = self.conn()?;
        let _span = query_span("delete_subscription");
        let deleted = diesel::delete(
            subscriptions::table
                .filter(subscriptions::user_id.eq(user))
                .filter(subscriptions::author_id.eq(author)),
        )
        .execute(&mut conn)
        .map_err(storage)?;
        Ok(deleted > 0)
    }

    fn subscribed_authors(
        &self,
        user: UserId,
        page: PageRequest,
    ) -> Result<Page<User>, DomainError> {
        let mut conn = self.conn()?;
        let _span = query_span("subscribed_authors");
        let rows: Vec<(UserRow, i64)> = subscriptions::table
            .inner_join(users::table.on(users::id.eq(subscriptions::author_id)))
            .filter(subscriptions::user_id.eq(user))
            .order(users::username.asc())
            .select((UserRow::as_select(), sql::<BigInt>("COUNT(*) OVER()")))
            .limit(page.limit)
            .offset(page.offset)
            .load(&mut conn)
            .map_err(storage)?;

        let total = match rows.first() {
            Some((_, total)) => *total,
            None if page.offset > 0 => subscriptions::table
                .filter(subscriptions::user_id.eq(user))
                .count()
                .get_result(&mut conn)
                .map_err(storage)?,
            None => 0,
        };

        Ok(Page {
            items: rows.into_iter().map(|(row, _)| row.into()).collect(),
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::DatabaseErrorInformation;

    struct ConstraintInfo(&'static str);

    impl DatabaseErrorInformation for ConstraintInfo {
        fn message(&self) -> &str {
            "violation"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            Some(self.0)
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn db_error(kind: DatabaseErrorKind, constraint: &'static str) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(ConstraintInfo(constraint)))
    }

    #[test]
    fn test_recipe_name_violation_is_conflict() {
        let err = recipe_write_error(db_error(
            DatabaseErrorKind::UniqueViolation,
            RECIPE_NAME_CONSTRAINT,
        ));
        assert!(matches!(err, DomainError::Conflict { field: "name", .. }));
    }

    #[test]
    fn test_other_violation_is_storage() {
        let err = recipe_write_error(db_error(
            DatabaseErrorKind::CheckViolation,
            "recipes_cooking_time_positive",
        ));
        assert!(matches!(err, DomainError::Storage(_)));
    }

    #[test]
    fn test_tx_error_keeps_domain_error() {
        let err: DomainError = TxError::Domain(DomainError::NotFound { entity: "recipe" }).into();
        assert_eq!(err, DomainError::NotFound { entity: "recipe" });

        let err: DomainError = TxError::from(DieselError::RollbackTransaction).into();
        assert!(matches!(err, DomainError::Storage(_)));
    }

    #[test]
    fn test_violation_kind_checks() {
        let err = db_error(DatabaseErrorKind::ForeignKeyViolation, "recipe_tags_tag_id_fkey");
        assert!(is_foreign_key_violation(&err));
        assert!(!is_unique_violation(&err));

        let err = db_error(DatabaseErrorKind::UniqueViolation, "favorites_user_recipe_unique");
        assert!(is_unique_violation(&err));
        assert!(!is_foreign_key_violation(&err));
        assert!(!is_unique_violation(&DieselError::NotFound));
        assert_eq!(
            violated_constraint(&db_error(
                DatabaseErrorKind::ForeignKeyViolation,
                "recipe_tags_tag_id_fkey"
            )),
            Some("recipe_tags_tag_id_fkey")
        );
    }
}
