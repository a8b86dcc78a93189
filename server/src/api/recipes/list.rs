use crate::api::{parse_flag, parse_number, query_pairs, ApiError, ErrorResponse};
use crate::auth::MaybeUser;
use crate::store::PgStore;
use axum::{
    extract::{RawQuery, State},
    Json,
};
use foodgram_core::{project_recipes, PageRequest, RecipeFilter, RecipeStore, RecipeView};
use serde::Serialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

/// Query parameters for listing recipes.
///
/// Parsed by hand from the raw query so `tags` can repeat. Keys with an
/// empty value are treated as absent.
#[derive(Debug, Default, PartialEq, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListRecipesParams {
    /// Only recipes by this author
    pub author: Option<i32>,
    /// Tag slug; repeat to match any of several tags
    pub tags: Option<Vec<String>>,
    /// 1 for recipes in the viewer's favorites, 0 for the rest
    #[param(value_type = Option<u8>)]
    pub is_favorited: Option<bool>,
    /// 1 for recipes in the viewer's shopping cart, 0 for the rest
    #[param(value_type = Option<u8>)]
    pub is_in_shopping_cart: Option<bool>,
    /// Page size (default 6, max 100)
    pub limit: Option<i64>,
    /// Number of recipes to skip
    pub offset: Option<i64>,
    /// 1-based page number, used when `offset` is absent
    pub page: Option<i64>,
}

impl ListRecipesParams {
    fn from_query(raw: Option<&str>) -> Result<Self, ApiError> {
        let mut params = Self::default();
        for (key, value) in query_pairs(raw) {
            if value.trim().is_empty() {
                continue;
            }
            match key.as_str() {
                "author" => params.author = Some(parse_number("author", &value)?),
                "tags" => params.tags.get_or_insert_with(Vec::new).push(value),
                "is_favorited" => params.is_favorited = Some(parse_flag("is_favorited", &value)?),
                "is_in_shopping_cart" => {
                    params.is_in_shopping_cart = Some(parse_flag("is_in_shopping_cart", &value)?)
                }
                "limit" => params.limit = Some(parse_number("limit", &value)?),
                "offset" => params.offset = Some(parse_number("offset", &value)?),
                "page" => params.page = Some(parse_number("page", &value)?),
                _ => {}
            }
        }
        Ok(params)
    }

    fn into_parts(self) -> (RecipeFilter, PageRequest) {
        let page = PageRequest::with_page(self.limit, self.offset, self.page);
        let filter = RecipeFilter {
            author: self.author,
            tags: self.tags.unwrap_or_default(),
            is_favorited: self.is_favorited,
            is_in_shopping_cart: self.is_in_shopping_cart,
        };
        (filter, page)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecipePage {
    /// Total number of matching recipes
    pub count: i64,
    pub results: Vec<RecipeView>,
}

fn parse_list_query(raw: Option<&str>) -> Result<(RecipeFilter, PageRequest), ApiError> {
    ListRecipesParams::from_query(raw).map(ListRecipesParams::into_parts)
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "Page of recipes, newest first", body = RecipePage),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
        (status = 401, description = "Invalid token", body = ErrorResponse)
    ),
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn list_recipes(
    MaybeUser(user): MaybeUser,
    State(store): State<Arc<PgStore>>,
    RawQuery(query): RawQuery,
) -> Result<Json<RecipePage>, ApiError> {
    let store: &PgStore = &store;
    let viewer = user.map(|u| u.id);

    let (filter, page) = parse_list_query(query.as_deref())?;
    let filter = filter.normalized_for(viewer);

    let found = store.find_recipes(&filter, viewer, page)?;
    let results = project_recipes(store, found.items, viewer)?;

    Ok(Json(RecipePage {
        count: found.total,
        results,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_parse_all_filters() {
        let (filter, page) = parse_list_query(Some(
            "author=4&tags=breakfast&tags=lunch&is_favorited=1&is_in_shopping_cart=0&limit=10&offset=20",
        ))
        .unwrap();

        assert_eq!(filter.author, Some(4));
        assert_eq!(filter.tags, vec!["breakfast", "lunch"]);
        assert_eq!(filter.is_favorited, Some(true));
        assert_eq!(filter.is_in_shopping_cart, Some(false));
        assert_eq!(page, PageRequest { limit: 10, offset: 20 });
    }

    #[test]
    fn test_empty_query_uses_defaults() {
        let (filter, page) = parse_list_query(None).unwrap();
        assert_eq!(filter, RecipeFilter::default());
        assert_eq!(page, PageRequest::default());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let (filter, _) = parse_list_query(Some("name=soup&ordering=-id")).unwrap();
        assert_eq!(filter, RecipeFilter::default());
    }

    #[test]
    fn test_empty_values_ignored() {
        let (filter, page) = parse_list_query(Some(
            "author=&tags=&is_favorited=&is_in_shopping_cart=&limit=&page=",
        ))
        .unwrap();
        assert_eq!(filter, RecipeFilter::default());
        assert_eq!(page, PageRequest::default());
    }

    #[test]
    fn test_page_number_selects_offset() {
        let (_, page) = parse_list_query(Some("page=3&limit=6")).unwrap();
        assert_eq!(page, PageRequest { limit: 6, offset: 12 });

        let (_, page) = parse_list_query(Some("page=3&limit=6&offset=1")).unwrap();
        assert_eq!(page.offset, 1);

        let err = parse_list_query(Some("page=two")).unwrap_err();
        assert!(err.body.fields.contains_key("page"));
    }

    #[test]
    fn test_bad_author_rejected() {
        let err = parse_list_query(Some("author=bob")).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.body.fields.contains_key("author"));
    }

    #[test]
    fn test_bad_flag_rejected() {
        let err = parse_list_query(Some("is_in_shopping_cart=maybe")).unwrap_err();
        assert!(err.body.fields.contains_key("is_in_shopping_cart"));
    }
}
