use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
    response::Redirect,
};
use sha2::{Digest, Sha256};

use crate::{config::AppConfig, error::AppError, repository::RepositoryState};

/// Name of the session cookie carried by the browser.
pub const SESSION_COOKIE: &str = "session";

// --- Password Hashing ---

/// hash_password
///
/// One-way argon2 hash with a fresh per-user salt, encoded as a PHC string.
/// The plaintext never leaves this function's scope.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Store(format!("password hashing failed: {e}")))
}

/// verify_password
///
/// Checks a candidate password against a stored PHC hash. An unparsable
/// stored hash counts as a failed check rather than an internal error.
pub fn verify_password(stored_hash: &str, candidate: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

// --- Session Tokens ---

/// mint_token
///
/// 32 random bytes, hex-encoded. The raw token travels only in the cookie;
/// the store holds its keyed digest.
pub fn mint_token() -> String {
    hex::encode(rand::random::<[u8; 32]>())
}

/// token_digest
///
/// Keyed SHA-256 digest of a session token. Keying with the configured
/// secret means a leaked sessions table cannot be replayed without it.
pub fn token_digest(secret: &str, token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

// --- Cookie Plumbing ---

/// session_cookie
///
/// Set-Cookie value establishing the session. HttpOnly keeps the token away
/// from page scripts.
pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// clear_session_cookie
///
/// Set-Cookie value that expires the session cookie immediately.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// session_token_from_headers
///
/// Extracts the session token from the request's Cookie header, if present.
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    let prefix = format!("{SESSION_COOKIE}=");
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(prefix.as_str()))
        .map(str::to_string)
}

// --- Authenticated Identity ---

/// AuthUser
///
/// The resolved identity of an authenticated request: the username the
/// session was opened under. Handlers receive this via the extractor below.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a function argument
/// in any protected handler. This cleanly separates authentication (extractor)
/// from business logic (the handler).
///
/// The process:
/// 1. Dependency Resolution: Accessing Repository and AppConfig from the application state.
/// 2. Cookie Extraction: Reading the opaque session token from the Cookie header.
/// 3. Store Lookup: Resolving the token's keyed digest to a username in the sessions table.
///
/// Rejection: redirects to /login on any failure, since the surface is
/// server-rendered pages rather than an API.
impl<S> FromRequestParts<S> for AuthUser
where
    // S must allow sending across threads and sharing.
    S: Send + Sync,
    // Allows the extractor to pull the Repository State from the app state.
    RepositoryState: FromRef<S>,
    // Allows the extractor to pull the AppConfig (for the session secret).
    AppConfig: FromRef<S>,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let token =
            session_token_from_headers(&parts.headers).ok_or_else(|| Redirect::to("/login"))?;

        // The session row stores only the keyed digest; a tampered or
        // logged-out token simply fails the lookup.
        let digest = token_digest(&config.session_secret, &token);
        match repo.session_username(&digest).await {
            Ok(Some(username)) => Ok(AuthUser { username }),
            Ok(None) => Err(Redirect::to("/login")),
            Err(_) => Err(Redirect::to("/login")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hash = hash_password("pw1234").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "pw1234"));
        assert!(!verify_password(&hash, "pw5678"));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(!verify_password("not-a-phc-string", "pw1234"));
    }

    #[test]
    fn token_digest_is_keyed_and_stable() {
        let token = mint_token();
        assert_eq!(token.len(), 64);
        assert_eq!(token_digest("k1", &token), token_digest("k1", &token));
        assert_ne!(token_digest("k1", &token), token_digest("k2", &token));
        // The digest never equals the raw token, so the store never holds it.
        assert_ne!(token_digest("k1", &token), token);
    }

    #[test]
    fn cookie_parsing_finds_session_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc123; lang=es"),
        );
        assert_eq!(
            session_token_from_headers(&headers),
            Some("abc123".to_string())
        );

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(session_token_from_headers(&headers), None);

        assert_eq!(session_token_from_headers(&HeaderMap::new()), None);
    }
}
