use crate::api::{parse_number, query_pairs, ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::store::PgStore;
use axum::{
    extract::{RawQuery, State},
    Json,
};
use foodgram_core::{subscriptions, PageRequest, SubscriptionView};
use serde::Serialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, PartialEq, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListSubscriptionsParams {
    /// Cap on recipes shown per author
    pub recipes_limit: Option<usize>,
    /// Page size (default 6, max 100)
    pub limit: Option<i64>,
    /// Number of authors to skip
    pub offset: Option<i64>,
    /// 1-based page number, used when `offset` is absent
    pub page: Option<i64>,
}

impl ListSubscriptionsParams {
    fn from_pairs(pairs: &[(String, String)]) -> Result<Self, ApiError> {
        let mut params = Self {
            recipes_limit: parse_recipes_limit(pairs)?,
            ..Self::default()
        };
        for (key, value) in pairs {
            if value.trim().is_empty() {
                continue;
            }
            match key.as_str() {
                "limit" => params.limit = Some(parse_number("limit", value)?),
                "offset" => params.offset = Some(parse_number("offset", value)?),
                "page" => params.page = Some(parse_number("page", value)?),
                _ => {}
            }
        }
        Ok(params)
    }

    fn page_request(&self) -> PageRequest {
        PageRequest::with_page(self.limit, self.offset, self.page)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriptionPage {
    /// Total number of followed authors
    pub count: i64,
    pub results: Vec<SubscriptionView>,
}

pub(super) fn parse_recipes_limit(pairs: &[(String, String)]) -> Result<Option<usize>, ApiError> {
    pairs
        .iter()
        .rev()
        .find(|(key, value)| key == "recipes_limit" && !value.trim().is_empty())
        .map(|(_, value)| parse_number("recipes_limit", value))
        .transpose()
}

#[utoipa::path(
    get,
    path = "/api/users/subscriptions",
    tag = "users",
    params(ListSubscriptionsParams),
    responses(
        (status = 200, description = "Followed authors, ordered by username", body = SubscriptionPage),
        (status = 400, description = "Invalid query", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_subscriptions(
    AuthUser(user): AuthUser,
    State(store): State<Arc<PgStore>>,
    RawQuery(query): RawQuery,
) -> Result<Json<SubscriptionPage>, ApiError> {
    let params = ListSubscriptionsParams::from_pairs(&query_pairs(query.as_deref()))?;

    let found = subscriptions::list_subscriptions(
        &*store,
        user.id,
        params.recipes_limit,
        params.page_request(),
    )?;
    Ok(Json(SubscriptionPage {
        count: found.total,
        results: found.items,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(query: &str) -> Vec<(String, String)> {
        query_pairs(Some(query))
    }

    #[test]
    fn test_recipes_limit() {
        assert_eq!(parse_recipes_limit(&pairs("recipes_limit=3")).unwrap(), Some(3));
        assert_eq!(parse_recipes_limit(&pairs("limit=3")).unwrap(), None);
        assert!(parse_recipes_limit(&pairs("recipes_limit=-1")).is_err());
    }

    #[test]
    fn test_page() {
        let params = ListSubscriptionsParams::from_pairs(&pairs("limit=2&offset=4&recipes_limit=1"))
            .unwrap();
        assert_eq!(params.recipes_limit, Some(1));
        assert_eq!(params.page_request(), PageRequest { limit: 2, offset: 4 });

        let params = ListSubscriptionsParams::from_pairs(&[]).unwrap();
        assert_eq!(params.page_request(), PageRequest::default());
    }

    #[test]
    fn test_page_number_and_empty_values() {
        let params =
            ListSubscriptionsParams::from_pairs(&pairs("page=2&limit=3&recipes_limit=&offset="))
                .unwrap();
        assert_eq!(params.recipes_limit, None);
        assert_eq!(params.page_request(), PageRequest { limit: 3, offset: 3 });
    }
}
