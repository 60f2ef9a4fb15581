use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Defines the routes accessible only to a client holding a valid session.
///
/// Access Control Strategy:
/// Every handler in this module relies on the `AuthUser` extractor middleware
/// being present on the router layer above this module. This guarantees that
/// all handlers receive a validated `AuthUser` carrying the session's
/// username; a request without one is redirected to /login before any
/// handler runs.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /
        // Renders the record entry forms plus the full listing tables.
        // POST /
        // Inserts one record selected by the `tipo` discriminator, then
        // always re-renders the listing with a status line.
        .route("/", get(handlers::get_index).post(handlers::post_index))
}
