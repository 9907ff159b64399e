use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::api::state::AppState;

use super::handlers;
use super::middleware::v1_auth_middleware;

pub fn v1_router(state: AppState) -> Router<AppState> {
    let characters = Router::new()
        .route("/", post(handlers::characters::create_character))
        .route(
            "/{name}",
            get(handlers::characters::get_character).patch(handlers::characters::update_character),
        );

    let quests = Router::new()
        .route("/{name}", get(handlers::quests::list_active_quests))
        .route("/{name}/generate", post(handlers::quests::generate_quests))
        .route("/{name}/complete", post(handlers::quests::complete_quest));

    let daily = Router::new()
        .route("/{name}/wrap-up", post(handlers::daily::wrap_up))
        .route("/{name}/reflection", post(handlers::daily::reflection))
        .route("/{name}/insight", post(handlers::daily::insight));

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(super::openapi::openapi_json))
        .merge(super::openapi::redoc_router());

    let protected_routes = Router::new()
        .nest("/characters", characters)
        .nest("/quests", quests)
        .nest("/daily", daily)
        .route_layer(middleware::from_fn_with_state(state, v1_auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}
