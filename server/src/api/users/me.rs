use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use axum::Json;
use foodgram_core::{AuthorView, User};

#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "users",
    responses(
        (status = 200, description = "The signed-in user", body = AuthorView),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me(AuthUser(user): AuthUser) -> Json<AuthorView> {
    Json(own_profile(&user))
}

fn own_profile(user: &User) -> AuthorView {
    AuthorView::from_user(user, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_own_profile_is_never_subscribed() {
        let user = User {
            id: 7,
            email: "cook@example.com".to_string(),
            username: "cook".to_string(),
            first_name: "Ann".to_string(),
            last_name: "Cook".to_string(),
            is_admin: true,
        };
        let value = serde_json::to_value(own_profile(&user)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 7,
                "username": "cook",
                "email": "cook@example.com",
                "first_name": "Ann",
                "last_name": "Cook",
                "is_subscribed": false
            })
        );
    }
}
