/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules.
/// This structure ensures that access control is applied explicitly at the
/// module level (via Axum layers), preventing accidental exposure of
/// protected endpoints.

/// Routes accessible without a session: health probe, registration, login,
/// and logout (which is a no-op when no session is present).
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware.
/// Requires a validated session cookie; rejection redirects to /login.
pub mod authenticated;
