pub mod ingredients;
pub mod public;
pub mod recipes;
pub mod tags;
pub mod users;

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use foodgram_core::{DomainError, NON_FIELD_ERRORS};
use serde::Serialize;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{OpenApi, ToSchema};

/// Shared error response used by all endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Messages keyed by the request field they refer to
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, Vec<String>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, field: &str, message: impl Into<String>) -> Self {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
        self
    }
}

/// Error type returned by handlers.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, body: ErrorResponse) -> Self {
        Self { status, body }
    }

    /// Report any domain error as 400, including `NotFound`.
    pub fn bad_request(err: DomainError) -> Self {
        match err {
            DomainError::Storage(_) => err.into(),
            err => Self::new(StatusCode::BAD_REQUEST, field_error(&err)),
        }
    }

    pub fn forbidden(message: &str) -> Self {
        Self::new(StatusCode::FORBIDDEN, ErrorResponse::new(message))
    }

    pub fn invalid_query(field: &str, message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("Invalid query parameters").with_field(field, message),
        )
    }
}

fn field_error(err: &DomainError) -> ErrorResponse {
    ErrorResponse::new("Invalid request").with_field(err.field(), err.to_string())
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::NotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, ErrorResponse::new(err.to_string()))
            }
            DomainError::Storage(message) => {
                tracing::error!(error = %message, "storage failure");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error"),
                )
            }
            _ => Self::new(StatusCode::BAD_REQUEST, field_error(&err)),
        }
    }
}

impl From<diesel::result::Error> for ApiError {
    fn from(err: diesel::result::Error) -> Self {
        DomainError::Storage(err.to_string()).into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("Invalid request body")
                .with_field(NON_FIELD_ERRORS, rejection.body_text()),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Key/value pairs of a raw query string, repeated keys kept.
pub fn query_pairs(raw: Option<&str>) -> Vec<(String, String)> {
    raw.map(|raw| {
        url::form_urlencoded::parse(raw.as_bytes())
            .into_owned()
            .collect()
    })
    .unwrap_or_default()
}

/// `1`/`true` or `0`/`false`.
pub fn parse_flag(field: &str, value: &str) -> Result<bool, ApiError> {
    match value.trim() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(ApiError::invalid_query(field, "Expected 0 or 1")),
    }
}

pub fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, ApiError> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::invalid_query(field, "Expected an integer"))
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(components(schemas(ErrorResponse)))]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    if let Some(components) = spec.components.as_mut() {
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }

    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        public::ApiDoc::openapi(),
        recipes::ApiDoc::openapi(),
        tags::ApiDoc::openapi(),
        ingredients::ApiDoc::openapi(),
        users::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);

        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (DomainError::MissingField { field: "tags" }, StatusCode::BAD_REQUEST),
            (
                DomainError::UnknownReference {
                    field: "ingredients",
                    ids: vec![9],
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::conflict("name", "taken"),
                StatusCode::BAD_REQUEST,
            ),
            (DomainError::SelfReference, StatusCode::BAD_REQUEST),
            (
                DomainError::EmptyState {
                    field: "shopping_cart",
                    message: "empty".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (DomainError::NotFound { entity: "recipe" }, StatusCode::NOT_FOUND),
            (
                DomainError::Storage("down".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err.clone()).status, status, "{err:?}");
        }
    }

    #[test]
    fn test_bad_request_forces_400_except_storage() {
        let err = ApiError::bad_request(DomainError::NotFound {
            entity: "favorites",
        });
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.fields["favorites"], vec!["favorites not found"]);

        let err = ApiError::bad_request(DomainError::Storage("x".to_string()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_body_is_field_keyed() {
        let err = ApiError::from(DomainError::DuplicateValue {
            field: "ingredients",
            value: "4".to_string(),
        });
        let body = serde_json::to_value(&err.body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "error": "Invalid request",
                "fields": {"ingredients": ["ingredients contains duplicate value 4"]}
            })
        );
    }

    #[test]
    fn test_not_found_has_no_fields() {
        let body = serde_json::to_value(
            ApiError::from(DomainError::NotFound { entity: "recipe" }).body,
        )
        .unwrap();
        assert_eq!(body, serde_json::json!({"error": "recipe not found"}));
    }

    #[test]
    fn test_query_pairs_keep_repeats() {
        let pairs = query_pairs(Some("tags=lunch&tags=dinner&author=3&name=cr%C3%A8me"));
        assert_eq!(
            pairs,
            vec![
                ("tags".to_string(), "lunch".to_string()),
                ("tags".to_string(), "dinner".to_string()),
                ("author".to_string(), "3".to_string()),
                ("name".to_string(), "crème".to_string()),
            ]
        );
        assert!(query_pairs(None).is_empty());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("is_favorited", "1").unwrap());
        assert!(parse_flag("is_favorited", "true").unwrap());
        assert!(!parse_flag("is_favorited", "0").unwrap());
        let err = parse_flag("is_favorited", "yes").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.body.fields.contains_key("is_favorited"));
    }

    #[test]
    fn test_openapi_contains_core_paths() {
        let spec = openapi();
        for path in [
            "/api/recipes",
            "/api/recipes/{id}",
            "/api/recipes/download_shopping_cart",
            "/api/users",
            "/api/users/{id}",
            "/api/users/me",
            "/api/users/{id}/subscribe",
            "/api/tags",
            "/api/ingredients",
            "/api/auth/token/login",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }

        let users = &spec.paths.paths["/api/users"];
        assert!(users.get.is_some(), "user listing missing");
        assert!(users.post.is_some(), "signup missing");
    }
}
