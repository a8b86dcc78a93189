pub mod get;
pub mod list;
pub mod me;
pub mod subscribe;
pub mod subscriptions;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/users endpoints (mounted at /api/users).
/// Signup shares the collection path, so it is routed here too.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list::list_users).post(crate::api::public::auth::signup::signup),
        )
        .route("/me", get(me::me))
        .route("/subscriptions", get(subscriptions::list_subscriptions))
        .route("/{id}", get(get::get_user))
        .route(
            "/{id}/subscribe",
            post(subscribe::subscribe).delete(subscribe::unsubscribe),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_users,
        crate::api::public::auth::signup::signup,
        get::get_user,
        me::me,
        subscribe::subscribe,
        subscribe::unsubscribe,
        subscriptions::list_subscriptions,
    ),
    components(schemas(
        foodgram_core::SubscriptionView,
        foodgram_core::ShortRecipeView,
        subscriptions::SubscriptionPage,
        list::UserPage,
    ))
)]
pub struct ApiDoc;
