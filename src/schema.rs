use sqlx::SqlitePool;

/// Idempotent schema creation, executed once at startup. Uniqueness rules
/// (usernames, student emails, the enrollment pair) and the cascading
/// foreign keys live here so the store enforces them regardless of what the
/// handlers do.
const DDL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        username      TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS students (
        id    INTEGER PRIMARY KEY AUTOINCREMENT,
        name  TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS courses (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        title       TEXT NOT NULL,
        description TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS enrollments (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        student_id      INTEGER NOT NULL REFERENCES students(id) ON DELETE CASCADE,
        course_id       INTEGER NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
        enrollment_date DATE NOT NULL DEFAULT CURRENT_DATE,
        UNIQUE (student_id, course_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sessions (
        token_digest TEXT PRIMARY KEY,
        username     TEXT NOT NULL,
        created_at   TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
];

/// init
///
/// Creates all tables if absent. Safe to run on every startup.
pub async fn init(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in DDL {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
