pub mod aggregation;
pub mod catalog;
pub mod error;
pub mod lists;
pub mod memory;
pub mod projection;
pub mod store;
pub mod subscriptions;
pub mod types;
pub mod validator;
pub mod writer;

pub use aggregation::{
    aggregate, render_shopping_list, shopping_list, ShoppingListLine, SHOPPING_LIST_FILENAME,
};
pub use catalog::{escape_like, CatalogStore};
pub use error::{DomainError, NON_FIELD_ERRORS};
pub use lists::{add_to_list, remove_from_list};
pub use memory::MemoryStore;
pub use projection::{
    project_recipe, project_recipes, project_users, AuthorView, RecipeView, ShortRecipeView, MISSING_IMAGE,
};
pub use store::{
    ListStore, RecipeFilter, RecipeStore, Store, SubscriptionStore, UnitOfWork, UserStore,
};
pub use subscriptions::{list_subscriptions, subscribe, unsubscribe, SubscriptionView};
pub use types::{
    Ingredient, IngredientAmount, IngredientId, Page, PageRequest, RecipeFieldChanges,
    RecipeFields, RecipeId, RecipeList, RecipeRecord, ResolvedIngredient, Tag, TagId, User,
    UserId,
};
pub use validator::{
    validate_create, validate_update, IngredientInput, RecipeInput, ValidatedChanges,
    ValidatedRecipe,
};
pub use writer::{create_recipe, delete_recipe, update_recipe};
