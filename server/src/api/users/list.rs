use crate::api::{parse_number, query_pairs, ApiError, ErrorResponse};
use crate::auth::MaybeUser;
use crate::store::PgStore;
use axum::{
    extract::{RawQuery, State},
    Json,
};
use foodgram_core::{project_users, AuthorView, PageRequest, UserStore};
use serde::Serialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, PartialEq, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersParams {
    /// Page size (default 6, max 100)
    pub limit: Option<i64>,
    /// Number of users to skip
    pub offset: Option<i64>,
    /// 1-based page number, used when `offset` is absent
    pub page: Option<i64>,
}

impl ListUsersParams {
    fn from_query(raw: Option<&str>) -> Result<Self, ApiError> {
        let mut params = Self::default();
        for (key, value) in query_pairs(raw) {
            if value.trim().is_empty() {
                continue;
            }
            match key.as_str() {
                "limit" => params.limit = Some(parse_number("limit", &value)?),
                "offset" => params.offset = Some(parse_number("offset", &value)?),
                "page" => params.page = Some(parse_number("page", &value)?),
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
pub struct UserPage {
    /// Total number of users
    pub count: i64,
    pub results: Vec<AuthorView>,
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    params(ListUsersParams),
    responses(
        (status = 200, description = "Page of users ordered by id", body = UserPage),
        (status = 400, description = "Invalid query", body = ErrorResponse),
        (status = 401, description = "Invalid token", body = ErrorResponse)
    ),
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn list_users(
    MaybeUser(user): MaybeUser,
    State(store): State<Arc<PgStore>>,
    RawQuery(query): RawQuery,
) -> Result<Json<UserPage>, ApiError> {
    let page = ListUsersParams::from_query(query.as_deref())?.page_request();

    let found = store.list_users(page)?;
    let results = project_users(&*store, &found.items, user.map(|u| u.id))?;

    Ok(Json(UserPage {
        count: found.total,
        results,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_params() {
        let params = ListUsersParams::from_query(Some("page=2&limit=10")).unwrap();
        assert_eq!(params.page_request(), PageRequest { limit: 10, offset: 10 });

        let params = ListUsersParams::from_query(Some("limit=&offset=")).unwrap();
        assert_eq!(params, ListUsersParams::default());
        assert_eq!(params.page_request(), PageRequest::default());
    }

    #[test]
    fn test_bad_limit_rejected() {
        let err = ListUsersParams::from_query(Some("limit=lots")).unwrap_err();
        assert!(err.body.fields.contains_key("limit"));
    }
}
