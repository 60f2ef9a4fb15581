use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any
/// client. These are the gateway functions of the Auth Gate: registration,
/// login, and logout. Logout lives here rather than behind the auth layer:
/// it is a no-op when no session is present, and a client with a stale
/// cookie must still land back on the login page.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // GET/POST /register
        // Self-registration: form display and account creation.
        .route(
            "/register",
            get(handlers::get_register).post(handlers::post_register),
        )
        // GET/POST /login
        // Credential check against the users table; success opens a session.
        .route("/login", get(handlers::get_login).post(handlers::post_login))
        // GET /logout
        // Unconditionally clears the session cookie and deletes the session row.
        .route("/logout", get(handlers::logout))
}
