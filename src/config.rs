use std::env;

/// AppConfig
///
/// Holds the application's entire configuration state. This struct is designed to be
/// immutable once loaded, ensuring consistency across all threads and services.
/// It is pulled into the application state via FromRef, embodying the "immutable AppConfig"
/// part of the Unified State Pattern.
#[derive(Clone)]
pub struct AppConfig {
    // Database connection string (SQLite).
    pub db_url: String,
    // Key used to digest session tokens before they are stored.
    pub session_secret: String,
    // TCP port the HTTP server listens on.
    pub port: u16,
    // Runtime environment marker. Controls logging format and secret requirements.
    pub env: Env,
}

/// Env
///
/// Defines the runtime context, used to switch between development conveniences
/// (pretty logs, fallback secrets, on-disk SQLite file) and production-grade
/// requirements (JSON logs, mandatory secrets).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// Provides a safe, non-panicking AppConfig instance primarily used for test setup.
    /// This allows us to instantiate the configuration without needing to set environment
    /// variables for lightweight unit or integration testing state scaffolding.
    fn default() -> Self {
        Self {
            db_url: "sqlite::memory:".to_string(),
            session_secret: "local-dev-session-secret".to_string(),
            port: 3000,
            env: Env::Local,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// The canonical function for initializing the application configuration at startup.
    /// It reads all parameters from environment variables and implements the **fail-fast** principle.
    ///
    /// # Panics
    /// Panics if a critical environment variable required for the current runtime environment
    /// (especially Production) is not found. This prevents the application from starting
    /// with an incomplete or insecure configuration.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .expect("FATAL: PORT must be a valid port number");

        // Session Secret Resolution
        // The production secret is mandatory and must be explicitly set.
        let session_secret = match env {
            Env::Production => {
                env::var("SECRET_KEY").expect("FATAL: SECRET_KEY must be set in production.")
            }
            // In local, we provide a fallback so the app starts out of the box.
            _ => env::var("SECRET_KEY").unwrap_or_else(|_| "local-dev-session-secret".to_string()),
        };

        let db_url = match env {
            // Local falls back to an on-disk SQLite file, created on first connect.
            Env::Local => env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://enrollment.db?mode=rwc".to_string()),
            // Production demands an explicit connection string.
            Env::Production => {
                env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in prod")
            }
        };

        Self {
            db_url,
            session_secret,
            port,
            env,
        }
    }
}
