use axum::{
    Json, Router, middleware,
    routing::{get, post},
};

use guestbook_types::api::StatusResponse;

use crate::auth::AppState;
use crate::middleware::require_auth;
use crate::{accounts, messages};

/// All HTTP routes. Everything under `/messages` except `popular` sits
/// behind the Basic-auth gate.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/register", post(accounts::register))
        .route("/activate", post(accounts::activate))
        .route("/messages/popular", get(messages::popular_messages))
        .route("/health", get(health))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route(
            "/messages/",
            get(messages::list_messages)
                .post(messages::create_message)
                .delete(messages::delete_message),
        )
        .route("/messages/search", get(messages::search_messages))
        .route(
            "/messages/{message_id}",
            get(messages::get_message).patch(messages::update_message),
        )
        .route("/messages/{message_id}/upvote", post(messages::upvote_message))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}

async fn health() -> Json<StatusResponse> {
    Json(StatusResponse::new("ok"))
}
