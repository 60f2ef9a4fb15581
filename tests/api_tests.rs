use enrollment_portal::{
    AppState,
    config::AppConfig,
    create_router,
    repository::{RepositoryState, SqliteRepository},
    schema,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::{str::FromStr, sync::Arc};
use tokio::net::TcpListener;

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
}

/// Boots the full application on an ephemeral port against a hermetic
/// in-memory database, mirroring the production startup sequence.
async fn spawn_app() -> TestApp {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory SQLite in tests");
    schema::init(&pool).await.expect("schema init failed");

    let repo = Arc::new(SqliteRepository::new(pool)) as RepositoryState;
    let state = AppState {
        repo,
        config: AppConfig::default(),
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address }
}

/// A client that behaves like a browser: cookie jar plus redirect following.
fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap()
}

/// A cookie-holding client that does NOT follow redirects, for asserting on
/// the redirects themselves.
fn manual_browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_index_requires_session() {
    let app = spawn_app().await;
    let client = manual_browser();

    let response = client
        .get(format!("{}/", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 303);
    assert_eq!(response.headers().get("location").unwrap(), "/login");
}

#[tokio::test]
async fn test_tampered_session_cookie_is_rejected() {
    let app = spawn_app().await;
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let response = client
        .get(format!("{}/", app.address))
        .header("cookie", "session=deadbeef")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 303);
    assert_eq!(response.headers().get("location").unwrap(), "/login");
}

#[tokio::test]
async fn test_register_login_and_add_student_end_to_end() {
    let app = spawn_app().await;
    let client = browser();

    // Register alice
    let response = client
        .post(format!("{}/register", app.address))
        .form(&[
            ("username", "alice"),
            ("password", "pw1234"),
            ("password2", "pw1234"),
        ])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    assert!(response.text().await.unwrap().contains("Registration successful"));

    // Login and follow the redirect to the index page
    let response = client
        .post(format!("{}/login", app.address))
        .form(&[("usuario", "alice"), ("contrasena", "pw1234")])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body = response.text().await.unwrap();
    assert!(body.contains("Signed in as <strong>alice</strong>"));

    // Add one student
    let response = client
        .post(format!("{}/", app.address))
        .form(&[
            ("tipo", "estudiante"),
            ("nombre", "Bob"),
            ("correo", "bob@example.com"),
        ])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body = response.text().await.unwrap();

    // The confirmation and exactly one listing row for Bob.
    assert!(body.contains("Record added."));
    assert_eq!(body.matches("bob@example.com").count(), 1);
    assert!(body.contains("<td>Bob</td>"));
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = spawn_app().await;
    let client = browser();

    let register = |client: &reqwest::Client| {
        client
            .post(format!("{}/register", app.address))
            .form(&[
                ("username", "alice"),
                ("password", "pw1234"),
                ("password2", "pw1234"),
            ])
            .send()
    };

    let first = register(&client).await.unwrap();
    assert!(first.text().await.unwrap().contains("Registration successful"));

    let second = register(&client).await.unwrap();
    assert!(second.text().await.unwrap().contains("already taken"));

    // The first registration still works for login.
    let response = client
        .post(format!("{}/login", app.address))
        .form(&[("usuario", "alice"), ("contrasena", "pw1234")])
        .send()
        .await
        .unwrap();
    assert!(response.text().await.unwrap().contains("Signed in as"));
}

#[tokio::test]
async fn test_login_with_wrong_password_fails() {
    let app = spawn_app().await;
    let client = browser();

    client
        .post(format!("{}/register", app.address))
        .form(&[
            ("username", "alice"),
            ("password", "pw1234"),
            ("password2", "pw1234"),
        ])
        .send()
        .await
        .unwrap();

    let response = client
        .post(format!("{}/login", app.address))
        .form(&[("usuario", "alice"), ("contrasena", "nope")])
        .send()
        .await
        .unwrap();
    let body = response.text().await.unwrap();
    assert!(body.contains("invalid username or password"));

    // No session was opened.
    let probe = manual_browser()
        .get(format!("{}/", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(probe.status(), 303);
}

#[tokio::test]
async fn test_duplicate_enrollment_is_rejected_end_to_end() {
    let app = spawn_app().await;
    let client = browser();

    client
        .post(format!("{}/register", app.address))
        .form(&[
            ("username", "alice"),
            ("password", "pw1234"),
            ("password2", "pw1234"),
        ])
        .send()
        .await
        .unwrap();
    client
        .post(format!("{}/login", app.address))
        .form(&[("usuario", "alice"), ("contrasena", "pw1234")])
        .send()
        .await
        .unwrap();

    // Seed one student and one course (ids 1 and 1).
    client
        .post(format!("{}/", app.address))
        .form(&[
            ("tipo", "estudiante"),
            ("nombre", "Bob"),
            ("correo", "bob@example.com"),
        ])
        .send()
        .await
        .unwrap();
    client
        .post(format!("{}/", app.address))
        .form(&[("tipo", "curso"), ("titulo", "Rust 101")])
        .send()
        .await
        .unwrap();

    let enroll = |client: &reqwest::Client| {
        client
            .post(format!("{}/", app.address))
            .form(&[
                ("tipo", "inscripcion"),
                ("estudiante_id", "1"),
                ("curso_id", "1"),
            ])
            .send()
    };

    let first = enroll(&client).await.unwrap();
    assert!(first.text().await.unwrap().contains("Record added."));

    let second = enroll(&client).await.unwrap();
    let body = second.text().await.unwrap();
    assert!(body.contains("already enrolled"));
}

#[tokio::test]
async fn test_enrollment_with_unknown_ids_is_rejected() {
    let app = spawn_app().await;
    let client = browser();

    client
        .post(format!("{}/register", app.address))
        .form(&[
            ("username", "alice"),
            ("password", "pw1234"),
            ("password2", "pw1234"),
        ])
        .send()
        .await
        .unwrap();
    client
        .post(format!("{}/login", app.address))
        .form(&[("usuario", "alice"), ("contrasena", "pw1234")])
        .send()
        .await
        .unwrap();

    let response = client
        .post(format!("{}/", app.address))
        .form(&[
            ("tipo", "inscripcion"),
            ("estudiante_id", "99"),
            ("curso_id", "42"),
        ])
        .send()
        .await
        .unwrap();
    let body = response.text().await.unwrap();
    assert!(body.contains("no student or course with that id exists"));
}

#[tokio::test]
async fn test_logout_closes_the_session() {
    let app = spawn_app().await;
    let client = manual_browser();

    client
        .post(format!("{}/register", app.address))
        .form(&[
            ("username", "alice"),
            ("password", "pw1234"),
            ("password2", "pw1234"),
        ])
        .send()
        .await
        .unwrap();
    let login = client
        .post(format!("{}/login", app.address))
        .form(&[("usuario", "alice"), ("contrasena", "pw1234")])
        .send()
        .await
        .unwrap();
    assert_eq!(login.status(), 303);

    // The session cookie grants access to the index page.
    let index = client
        .get(format!("{}/", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(index.status(), 200);

    // Logout clears the cookie and redirects to the login page.
    let logout = client
        .get(format!("{}/logout", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(logout.status(), 303);
    assert_eq!(logout.headers().get("location").unwrap(), "/login");

    // No listing is leaked afterwards.
    let index = client
        .get(format!("{}/", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(index.status(), 303);
    assert_eq!(index.headers().get("location").unwrap(), "/login");
}
