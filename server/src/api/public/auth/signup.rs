use crate::api::{ApiError, ErrorResponse};
use crate::auth::hash_password;
use crate::models::{NewUser, UserRow};
use crate::schema::users;
use crate::store::PgStore;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use foodgram_core::DomainError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

const MAX_EMAIL_CHARS: usize = 254;
const MAX_NAME_CHARS: usize = 150;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SignupResponse {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// Collect every problem with the request, keyed by field.
fn validate(req: &SignupRequest) -> Result<(), ApiError> {
    let mut body = ErrorResponse::new("Invalid request");

    let email = req.email.trim();
    if email.is_empty() {
        body = body.with_field("email", "This field may not be blank.");
    } else if email.chars().count() > MAX_EMAIL_CHARS || !is_plausible_email(email) {
        body = body.with_field("email", "Enter a valid email address.");
    }

    let username = req.username.trim();
    if username.is_empty() {
        body = body.with_field("username", "This field may not be blank.");
    } else if username.chars().count() > MAX_NAME_CHARS {
        body = body.with_field("username", "Ensure this field has no more than 150 characters.");
    } else if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-'))
    {
        body = body.with_field(
            "username",
            "Letters, digits and @/./+/-/_ only.",
        );
    }

    for (field, value) in [("first_name", &req.first_name), ("last_name", &req.last_name)] {
        if value.trim().is_empty() {
            body = body.with_field(field, "This field may not be blank.");
        } else if value.chars().count() > MAX_NAME_CHARS {
            body = body.with_field(field, "Ensure this field has no more than 150 characters.");
        }
    }

    if req.password.is_empty() {
        body = body.with_field("password", "This field may not be blank.");
    }

    if body.fields.is_empty() {
        Ok(())
    } else {
        Err(ApiError::new(StatusCode::BAD_REQUEST, body))
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Emails are stored lowercased so uniqueness and login agree on case.
fn normalized_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn conflict_field(err: &DieselError) -> Option<&'static str> {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            match info.constraint_name() {
                Some("users_email_key" | "users_email_lower_key") => Some("email"),
                _ => Some("username"),
            }
        }
        _ => None,
    }
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body(content = SignupRequest, example = json!({
        "email": "cook@example.com",
        "username": "cook",
        "first_name": "Ann",
        "last_name": "Cook",
        "password": "correct horse battery staple"
    })),
    responses(
        (status = 201, description = "User created successfully", body = SignupResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Email or username already taken", body = ErrorResponse)
    )
)]
pub async fn signup(
    State(store): State<Arc<PgStore>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let Json(req) = payload?;
    validate(&req)?;

    let password_hash = hash_password(&req.password).map_err(|e| {
        tracing::error!(error = %e, "password hashing failed");
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new("Failed to hash password"),
        )
    })?;

    let email = normalized_email(&req.email);
    let mut conn = store.conn()?;
    let new_user = NewUser {
        email: &email,
        username: req.username.trim(),
        first_name: req.first_name.trim(),
        last_name: req.last_name.trim(),
        password_hash: &password_hash,
    };

    let user: UserRow = diesel::insert_into(users::table)
        .values(&new_user)
        .returning(UserRow::as_returning())
        .get_result(&mut conn)
        .map_err(|e| match conflict_field(&e) {
            Some(field) => ApiError::new(
                StatusCode::CONFLICT,
                ErrorResponse::new("User already exists")
                    .with_field(field, format!("A user with that {field} already exists.")),
            ),
            None => DomainError::Storage(e.to_string()).into(),
        })?;

    tracing::info!(user_id = user.id, "user signed up");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SignupRequest {
        SignupRequest {
            email: "cook@example.com".to_string(),
            username: "cook.1".to_string(),
            first_name: "Ann".to_string(),
            last_name: "Cook".to_string(),
            password: "secret".to_string(),
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(validate(&request()).is_ok());
    }

    #[test]
    fn test_reports_every_bad_field() {
        let req = SignupRequest {
            email: "not-an-email".to_string(),
            username: "bad name!".to_string(),
            first_name: " ".to_string(),
            password: String::new(),
            ..request()
        };
        let err = validate(&req).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        let fields: Vec<&str> = err.body.fields.keys().map(String::as_str).collect();
        assert_eq!(fields, vec!["email", "first_name", "password", "username"]);
    }

    #[test]
    fn test_email_shape() {
        assert!(is_plausible_email("a@b.co"));
        assert!(!is_plausible_email("@b.co"));
        assert!(!is_plausible_email("a@localhost"));
        assert!(!is_plausible_email("a@.co"));
    }

    #[test]
    fn test_email_is_lowercased() {
        assert_eq!(normalized_email("  Cook@Example.COM "), "cook@example.com");
        assert_eq!(
            normalized_email("cook@example.com"),
            normalized_email("COOK@EXAMPLE.COM")
        );
    }
}
