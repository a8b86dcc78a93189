use crate::api::ErrorResponse;
use crate::store::PgStore;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use foodgram_core::User;
use std::sync::Arc;

use super::db::get_user_from_token;

/// Extractor that validates the Authorization header and provides the authenticated user.
///
/// Accepts `Token <t>` and `Bearer <t>`.
pub struct AuthUser(pub User);

/// Like [`AuthUser`], but lets requests without an Authorization header through.
/// A header that is present must still carry a valid token.
pub struct MaybeUser(pub Option<User>);

#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    MissingHeader,
    InvalidHeader,
    InvalidFormat,
    InvalidToken,
    Unavailable,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingHeader => (StatusCode::UNAUTHORIZED, "Missing Authorization header"),
            AuthError::InvalidHeader => (StatusCode::UNAUTHORIZED, "Invalid Authorization header"),
            AuthError::InvalidFormat => (
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header format",
            ),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            AuthError::Unavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to check credentials",
            ),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Pull the token out of `Authorization: Token <t>` or `Authorization: Bearer <t>`.
fn token_from_headers(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let auth_str = auth_header.to_str().map_err(|_| AuthError::InvalidHeader)?;

    auth_str
        .strip_prefix("Token ")
        .or_else(|| auth_str.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(Some)
        .ok_or(AuthError::InvalidFormat)
}

fn authenticate(store: &PgStore, token: &str) -> Result<User, AuthError> {
    let mut conn = store.conn().map_err(|e| {
        tracing::error!(error = %e, "auth lookup failed");
        AuthError::Unavailable
    })?;
    let user = get_user_from_token(&mut conn, token).map_err(|e| {
        tracing::error!(error = %e, "auth lookup failed");
        AuthError::Unavailable
    })?;
    user.map(User::from).ok_or(AuthError::InvalidToken)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<PgStore>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let store = Arc::<PgStore>::from_ref(state);
        let token = token_from_headers(&parts.headers)?.ok_or(AuthError::MissingHeader)?;
        authenticate(&store, token).map(AuthUser)
    }
}

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
    Arc<PgStore>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let store = Arc::<PgStore>::from_ref(state);
        match token_from_headers(&parts.headers)? {
            Some(token) => authenticate(&store, token).map(|user| MaybeUser(Some(user))),
            None => Ok(MaybeUser(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_token_and_bearer_schemes() {
        assert_eq!(token_from_headers(&headers("Token abc")), Ok(Some("abc")));
        assert_eq!(token_from_headers(&headers("Bearer xyz")), Ok(Some("xyz")));
    }

    #[test]
    fn test_missing_header_is_anonymous() {
        assert_eq!(token_from_headers(&HeaderMap::new()), Ok(None));
    }

    #[test]
    fn test_bad_scheme_rejected() {
        assert_eq!(
            token_from_headers(&headers("Basic dXNlcg==")),
            Err(AuthError::InvalidFormat)
        );
        assert_eq!(
            token_from_headers(&headers("Token ")),
            Err(AuthError::InvalidFormat)
        );
    }

    #[test]
    fn test_rejection_status() {
        assert_eq!(
            AuthError::InvalidToken.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::Unavailable.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
