use crate::api::{ApiError, ErrorResponse};
use crate::auth::{create_session, find_user_by_email, verify_password};
use crate::config::Config;
use crate::store::PgStore;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use foodgram_core::NON_FIELD_ERRORS;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub auth_token: String,
}

fn invalid_credentials() -> ApiError {
    ApiError::new(
        StatusCode::BAD_REQUEST,
        ErrorResponse::new("Invalid credentials").with_field(
            NON_FIELD_ERRORS,
            "Unable to log in with provided credentials.",
        ),
    )
}

#[utoipa::path(
    post,
    path = "/api/auth/token/login",
    tag = "auth",
    request_body(content = LoginRequest, example = json!({"email": "cook@example.com", "password": "password"})),
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(store): State<Arc<PgStore>>,
    State(config): State<Arc<Config>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload?;
    let mut conn = store.conn()?;

    let user = find_user_by_email(&mut conn, req.email.trim())?.ok_or_else(invalid_credentials)?;
    if !verify_password(&req.password, &user.password_hash) {
        tracing::info!(user_id = user.id, "login rejected");
        return Err(invalid_credentials());
    }

    let auth_token = create_session(&mut conn, user.id, config.session_ttl_days)?;
    tracing::info!(user_id = user.id, "session created");

    Ok(Json(LoginResponse { auth_token }))
}
