use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::events::{
    create_event, delete_event, download_events, event_details, get_event, list_events,
    previous_events, search_events, update_event, upcoming_events,
};
use crate::handlers::health_check;
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(event_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
}

// Static segments win over `:event_id` in the router, so the named listings
// never reach the id handlers.
fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/upcoming-events", get(upcoming_events))
        .route("/events/previous-events", get(previous_events))
        .route("/events/search", get(search_events))
        .route("/events/download", get(download_events))
        .route("/events/event-details", get(event_details))
        .route(
            "/events/:event_id",
            get(get_event).put(update_event).delete(delete_event),
        )
}
