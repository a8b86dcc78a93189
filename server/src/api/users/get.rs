use crate::api::{ApiError, ErrorResponse};
use crate::auth::MaybeUser;
use crate::store::PgStore;
use axum::{
    extract::{Path, State},
    Json,
};
use foodgram_core::{project_users, AuthorView, DomainError, UserId, UserStore};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User profile", body = AuthorView),
        (status = 401, description = "Invalid token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn get_user(
    MaybeUser(viewer): MaybeUser,
    State(store): State<Arc<PgStore>>,
    Path(id): Path<UserId>,
) -> Result<Json<AuthorView>, ApiError> {
    let user = store
        .user_by_id(id)?
        .ok_or(DomainError::NotFound { entity: "user" })?;

    let view = project_users(&*store, std::slice::from_ref(&user), viewer.map(|u| u.id))?
        .pop()
        .ok_or(DomainError::NotFound { entity: "user" })?;
    Ok(Json(view))
}
