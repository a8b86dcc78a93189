use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::store::PgStore;
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};
use foodgram_core::{render_shopping_list, shopping_list, SHOPPING_LIST_FILENAME};
use std::sync::Arc;

/// Totals of every ingredient across the recipes in the user's cart, as a
/// plain-text attachment.
#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart",
    tag = "recipes",
    responses(
        (status = 200, description = "Shopping list file", content_type = "text/plain", body = String),
        (status = 400, description = "Shopping cart is empty", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn download_shopping_cart(
    AuthUser(user): AuthUser,
    State(store): State<Arc<PgStore>>,
) -> Result<impl IntoResponse, ApiError> {
    let lines = shopping_list(&*store, user.id)?;
    let body = render_shopping_list(&lines);

    tracing::info!(user_id = user.id, lines = lines.len(), "shopping list downloaded");

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{SHOPPING_LIST_FILENAME}\""),
            ),
        ],
        body,
    ))
}
