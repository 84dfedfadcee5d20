pub mod error;
pub mod routes;
pub mod state;

use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

/// Origins the CORS layer should allow. `None` means no list was
/// configured and any origin is accepted; entries that are not valid
/// header values are dropped with a warning rather than silently
/// widening access.
fn allowed_origins(origins: &[String]) -> Option<Vec<HeaderValue>> {
    if origins.is_empty() {
        return None;
    }
    Some(
        origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring unparseable CORS origin");
                    None
                }
            })
            .collect(),
    )
}

pub fn build_router(state: AppState) -> Router {
    let cors = match allowed_origins(&state.settings.app.cors_origins) {
        Some(origins) => CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let room_routes = Router::new()
        .route("/", post(routes::room::create))
        .route("/", delete(routes::room::delete_bulk))
        .route("/{room_id}", get(routes::room::get))
        .route("/{room_id}", delete(routes::room::delete_one))
        .route("/{room_id}/participants", post(routes::participant::join))
        .route(
            "/{room_id}/participants/{name}",
            delete(routes::participant::leave),
        )
        .route("/{room_id}/recordings", get(routes::recording::list_by_room));

    let recording_routes = Router::new()
        .route("/{recording_id}", get(routes::recording::get))
        .route("/{recording_id}", delete(routes::recording::delete));

    Router::new()
        .route("/healthz", get(routes::health::healthz))
        .route("/webhook", post(routes::webhook::receive))
        .nest("/api/rooms", room_routes)
        .nest("/api/recordings", recording_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
