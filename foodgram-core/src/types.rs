use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::ToSchema;

pub type UserId = i32;
pub type TagId = i32;
pub type IngredientId = i32;
pub type RecipeId = i32;

static TAG_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#[A-Fa-f0-9]{6}$").expect("tag color pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    /// Hex color, `#RRGGBB`
    pub color: String,
    pub slug: String,
}

impl Tag {
    pub fn is_valid_color(color: &str) -> bool {
        TAG_COLOR.is_match(color)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
}

/// A recipe row as stored. The author is gone when the account was deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeRecord {
    pub id: RecipeId,
    pub author_id: Option<UserId>,
    pub name: String,
    pub image: Option<String>,
    pub text: String,
    pub cooking_time: i32,
    pub created_at: DateTime<Utc>,
}

impl RecipeRecord {
    /// Whether `user` may change or delete this recipe.
    pub fn editable_by(&self, user: &User) -> bool {
        user.is_admin || self.author_id == Some(user.id)
    }
}

/// Scalar columns of a recipe, validated and ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeFields {
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Scalar column changes for an update. `None` leaves the column alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFieldChanges {
    pub name: Option<String>,
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
}

impl RecipeFieldChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.image.is_none()
            && self.text.is_none()
            && self.cooking_time.is_none()
    }
}

/// An ingredient resolved from the catalog together with the requested amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIngredient {
    pub ingredient: Ingredient,
    pub amount: i32,
}

/// Ingredient as it appears inside a recipe: catalog data plus the join-row amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IngredientAmount {
    pub id: IngredientId,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Per-user recipe lists sharing the same add/remove semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipeList {
    Favorites,
    ShoppingCart,
}

impl RecipeList {
    pub fn field(self) -> &'static str {
        match self {
            RecipeList::Favorites => "favorites",
            RecipeList::ShoppingCart => "shopping_cart",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RecipeList::Favorites => "favorites",
            RecipeList::ShoppingCart => "shopping cart",
        }
    }
}

/// Limit/offset window over a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub offset: i64,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: i64 = 6;
    pub const MAX_LIMIT: i64 = 100;

    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
            offset: offset.unwrap_or(0).max(0),
        }
    }

    /// Like `new`, but a 1-based `page` selects the offset when no explicit
    /// offset is given.
    pub fn with_page(limit: Option<i64>, offset: Option<i64>, page: Option<i64>) -> Self {
        let mut request = Self::new(limit, offset);
        if let (None, Some(page)) = (offset, page) {
            request.offset = (page.max(1) - 1).saturating_mul(request.limit);
        }
        request
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_color() {
        assert!(Tag::is_valid_color("#E26C2D"));
        assert!(Tag::is_valid_color("#49b64e"));
        assert!(!Tag::is_valid_color("E26C2D"));
        assert!(!Tag::is_valid_color("#E26C2"));
        assert!(!Tag::is_valid_color("#GGGGGG"));
        assert!(!Tag::is_valid_color("#E26C2D0"));
    }

    #[test]
    fn test_page_request_clamps() {
        let page = PageRequest::new(Some(0), Some(-5));
        assert_eq!(page.limit, 1);
        assert_eq!(page.offset, 0);

        let page = PageRequest::new(Some(10_000), None);
        assert_eq!(page.limit, PageRequest::MAX_LIMIT);

        assert_eq!(PageRequest::default().limit, PageRequest::DEFAULT_LIMIT);
    }

    #[test]
    fn test_page_number_sets_offset() {
        assert_eq!(
            PageRequest::with_page(Some(10), None, Some(3)),
            PageRequest { limit: 10, offset: 20 }
        );
        assert_eq!(
            PageRequest::with_page(None, None, Some(2)).offset,
            PageRequest::DEFAULT_LIMIT
        );
        assert_eq!(PageRequest::with_page(Some(5), None, Some(0)).offset, 0);
        // explicit offset wins
        assert_eq!(PageRequest::with_page(Some(5), Some(1), Some(4)).offset, 1);
    }

    #[test]
    fn test_editable_by() {
        let recipe = RecipeRecord {
            id: 1,
            author_id: Some(7),
            name: "Soup".to_string(),
            image: None,
            text: "Boil".to_string(),
            cooking_time: 10,
            created_at: Utc::now(),
        };
        let mut user = User {
            id: 8,
            email: "a@b.c".to_string(),
            username: "other".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            is_admin: false,
        };
        assert!(!recipe.editable_by(&user));
        user.is_admin = true;
        assert!(recipe.editable_by(&user));
        user.is_admin = false;
        user.id = 7;
        assert!(recipe.editable_by(&user));
    }
}
