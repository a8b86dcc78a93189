use super::subscriptions::parse_recipes_limit;
use crate::api::{query_pairs, ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::store::PgStore;
use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    Json,
};
use foodgram_core::{subscriptions, DomainError, SubscriptionView, UserId};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/users/{id}/subscribe",
    tag = "users",
    params(
        ("id" = i32, Path, description = "Author ID"),
        ("recipes_limit" = Option<usize>, Query, description = "Cap on recipes shown for the author")
    ),
    responses(
        (status = 201, description = "Subscribed", body = SubscriptionView),
        (status = 400, description = "Self-subscription or already subscribed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Author not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn subscribe(
    AuthUser(user): AuthUser,
    State(store): State<Arc<PgStore>>,
    Path(author_id): Path<UserId>,
    RawQuery(query): RawQuery,
) -> Result<(StatusCode, Json<SubscriptionView>), ApiError> {
    let recipes_limit = parse_recipes_limit(&query_pairs(query.as_deref()))?;
    let view = subscriptions::subscribe(&*store, user.id, author_id, recipes_limit)?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}/subscribe",
    tag = "users",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 400, description = "Not subscribed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Author not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn unsubscribe(
    AuthUser(user): AuthUser,
    State(store): State<Arc<PgStore>>,
    Path(author_id): Path<UserId>,
) -> Result<StatusCode, ApiError> {
    subscriptions::unsubscribe(&*store, user.id, author_id).map_err(|e| match e {
        DomainError::NotFound {
            entity: "subscription",
        } => ApiError::bad_request(e),
        e => e.into(),
    })?;
    Ok(StatusCode::NO_CONTENT)
}
