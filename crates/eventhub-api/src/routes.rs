use crate::{handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Profiles
        .route(
            "/profiles/{id}",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route(
            "/profiles/{id}/completeness",
            get(handlers::profile_completeness),
        )
        // Organizations
        .route(
            "/organizations/search",
            get(handlers::search_organizations),
        )
        // Events
        .route("/events", get(handlers::list_events))
        .route("/events/{id}", get(handlers::get_event))
        .route("/events/{id}/register", post(handlers::register_for_event))
        .route("/events/{id}/attend", post(handlers::record_attendance))
        // AI
        .route("/ai/description", post(handlers::generate_description))
        .route("/ai/summary", post(handlers::summarize_event))
        .route("/ai/chat", post(handlers::chat))
        .with_state(state)
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
}
