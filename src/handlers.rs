use axum::{
    extract::{Form, State},
    http::{HeaderMap, header},
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{
    AppState,
    auth::{self, AuthUser},
    error::AppError,
    models::{LoginForm, NewRecord, RecordForm, RegisterForm},
    render,
};

// --- Auth Gate Handlers ---

/// get_register
///
/// [Public Route] Renders the self-registration form.
pub async fn get_register() -> Html<String> {
    Html(render::register_page(None))
}

/// post_register
///
/// [Public Route] Creates a new account from `username`/`password`/`password2`.
/// Validation and conflict errors are rendered as an inline status line above
/// the re-displayed form; they never escape as HTTP error responses.
pub async fn post_register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Html<String> {
    match register(&state, &form).await {
        Ok(()) => Html(render::register_success_page()),
        Err(e) => Html(render::register_page(Some(&e.user_message()))),
    }
}

/// register
///
/// The Auth Gate registration operation: validate fields, hash the password,
/// insert the account. The store's UNIQUE constraint turns a duplicate
/// username into a `Conflict`.
async fn register(state: &AppState, form: &RegisterForm) -> Result<(), AppError> {
    let (username, password) = form.validate()?;
    let password_hash = auth::hash_password(&password)?;
    state.repo.create_user(&username, &password_hash).await?;
    tracing::info!(username = %username, "user registered");
    Ok(())
}

/// get_login
///
/// [Public Route] Renders the login form.
pub async fn get_login() -> Html<String> {
    Html(render::login_page(None))
}

/// post_login
///
/// [Public Route] Authenticates `usuario`/`contrasena`. On success the
/// response sets the session cookie and redirects to `/`; on failure the
/// login form is re-rendered with a single generic message, identical for an
/// unknown username and a wrong password.
pub async fn post_login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    match login(&state, &form).await {
        Ok(cookie) => ([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response(),
        Err(e) => Html(render::login_page(Some(&e.user_message()))).into_response(),
    }
}

/// login
///
/// The Auth Gate login operation. Success mints an opaque session token,
/// persists its keyed digest under the username, and returns the Set-Cookie
/// value. Any credential failure collapses into `AppError::Auth`.
async fn login(state: &AppState, form: &LoginForm) -> Result<String, AppError> {
    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        return Err(AppError::Validation(
            "username and password are required".to_string(),
        ));
    }

    let user = state.repo.find_user(username).await?;
    match user {
        Some(user) if auth::verify_password(&user.password_hash, &form.password) => {
            let token = auth::mint_token();
            let digest = auth::token_digest(&state.config.session_secret, &token);
            state.repo.create_session(&digest, &user.username).await?;
            tracing::info!(username = %user.username, "session opened");
            Ok(auth::session_cookie(&token))
        }
        _ => Err(AppError::Auth),
    }
}

/// logout
///
/// [Public Route] Clears the session unconditionally. The session row is
/// deleted if the cookie resolves to one; an absent or stale cookie is a
/// no-op. Either way the cookie is expired and the client is redirected to
/// the login page.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = auth::session_token_from_headers(&headers) {
        let digest = auth::token_digest(&state.config.session_secret, &token);
        if let Err(e) = state.repo.delete_session(&digest).await {
            // Logout must still succeed from the client's point of view.
            tracing::warn!("failed to delete session row: {e}");
        }
    }
    (
        [(header::SET_COOKIE, auth::clear_session_cookie())],
        Redirect::to("/login"),
    )
        .into_response()
}

// --- Protected Handlers ---

/// get_index
///
/// [Protected Route] Renders the entry forms plus the full listing of
/// students, courses, and enrollments.
pub async fn get_index(
    AuthUser { username }: AuthUser,
    State(state): State<AppState>,
) -> Result<Html<String>, AppError> {
    let listing = state.repo.list_all().await?;
    Ok(Html(render::index_page(&username, None, &listing)))
}

/// post_index
///
/// [Protected Route] The record entry submission. Dispatches on the `tipo`
/// discriminator, then **always** re-renders the full listing with a
/// human-readable status line, whether the insert succeeded or failed.
pub async fn post_index(
    AuthUser { username }: AuthUser,
    State(state): State<AppState>,
    Form(form): Form<RecordForm>,
) -> Result<Html<String>, AppError> {
    let message = match submit(&state, form).await {
        Ok(confirmation) => confirmation,
        // Validation/conflict/store failures become the status line; the
        // failed insert has already rolled back.
        Err(e) => e.user_message(),
    };

    let listing = state.repo.list_all().await?;
    Ok(Html(render::index_page(
        &username,
        Some(&message),
        &listing,
    )))
}

/// submit
///
/// The Record Entry Service: validate the form into a typed payload, insert
/// it in a transaction, and return the confirmation message.
async fn submit(state: &AppState, form: RecordForm) -> Result<String, AppError> {
    match form.validate()? {
        NewRecord::Student(new) => {
            state.repo.insert_student(new).await?;
        }
        NewRecord::Course(new) => {
            state.repo.insert_course(new).await?;
        }
        NewRecord::Enrollment(new) => {
            state.repo.insert_enrollment(new).await?;
        }
    }
    Ok("Record added.".to_string())
}
