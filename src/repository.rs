use crate::error::AppError;
use crate::models::{
    Course, Enrollment, Listing, NewCourse, NewEnrollment, NewStudent, Student, User,
};
use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::error::ErrorKind;
use std::sync::Arc;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations. This is the core
/// of the Repository Abstraction pattern, allowing the handlers to interact with
/// the data layer without knowing the specific implementation (SQLite, Mock, etc.).
///
/// **Send + Sync + async_trait** are required to make the trait object (`Arc<dyn Repository>`)
/// safely shareable and usable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Credential Store ---
    // Fails with `Conflict` if the username is already taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError>;
    async fn find_user(&self, username: &str) -> Result<Option<User>, AppError>;

    // --- Sessions ---
    // Only the keyed digest of the session token is ever stored.
    async fn create_session(&self, token_digest: &str, username: &str) -> Result<(), AppError>;
    async fn session_username(&self, token_digest: &str) -> Result<Option<String>, AppError>;
    // Idempotent: deleting an absent session is not an error.
    async fn delete_session(&self, token_digest: &str) -> Result<(), AppError>;

    // --- Record Entry ---
    // Each insert runs in its own transaction; on failure the store is unchanged.
    async fn insert_student(&self, new: NewStudent) -> Result<Student, AppError>;
    async fn insert_course(&self, new: NewCourse) -> Result<Course, AppError>;
    // Fails with `Conflict` for a duplicate (student, course) pair or a dangling id.
    async fn insert_enrollment(&self, new: NewEnrollment) -> Result<Enrollment, AppError>;

    // --- Listing ---
    // Full table scans, ordered by primary key.
    async fn list_all(&self) -> Result<Listing, AppError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// SqliteRepository
///
/// The concrete implementation of the `Repository` trait, backed by SQLite.
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// map_conflict
///
/// Translates a driver error into the application taxonomy: uniqueness and
/// foreign-key violations become user-correctable `Conflict`s with the given
/// messages; anything else is an unexpected `Store` failure.
fn map_conflict(e: sqlx::Error, unique_msg: &str, fk_msg: &str) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        match db.kind() {
            ErrorKind::UniqueViolation => return AppError::Conflict(unique_msg.to_string()),
            ErrorKind::ForeignKeyViolation => return AppError::Conflict(fk_msg.to_string()),
            _ => {}
        }
    }
    AppError::from(e)
}

#[async_trait]
impl Repository for SqliteRepository {
    /// create_user
    ///
    /// Inserts a new account row. The UNIQUE constraint on `username` is the
    /// single source of truth for duplicate detection.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash) VALUES (?, ?) \
             RETURNING id, username, password_hash",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            map_conflict(
                e,
                "that username is already taken",
                "that username is already taken",
            )
        })?;
        tx.commit().await?;
        Ok(user)
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_session(&self, token_digest: &str, username: &str) -> Result<(), AppError> {
        sqlx::query("INSERT INTO sessions (token_digest, username) VALUES (?, ?)")
            .bind(token_digest)
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn session_username(&self, token_digest: &str) -> Result<Option<String>, AppError> {
        let username =
            sqlx::query_scalar::<_, String>("SELECT username FROM sessions WHERE token_digest = ?")
                .bind(token_digest)
                .fetch_optional(&self.pool)
                .await?;
        Ok(username)
    }

    async fn delete_session(&self, token_digest: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE token_digest = ?")
            .bind(token_digest)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// insert_student
    ///
    /// Transactional single-row insert. A duplicate email rolls back and
    /// surfaces as a `Conflict`.
    async fn insert_student(&self, new: NewStudent) -> Result<Student, AppError> {
        let mut tx = self.pool.begin().await?;
        let student = sqlx::query_as::<_, Student>(
            "INSERT INTO students (name, email) VALUES (?, ?) RETURNING id, name, email",
        )
        .bind(&new.name)
        .bind(&new.email)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            map_conflict(
                e,
                "a student with that email already exists",
                "a student with that email already exists",
            )
        })?;
        tx.commit().await?;
        Ok(student)
    }

    async fn insert_course(&self, new: NewCourse) -> Result<Course, AppError> {
        let mut tx = self.pool.begin().await?;
        let course = sqlx::query_as::<_, Course>(
            "INSERT INTO courses (title, description) VALUES (?, ?) \
             RETURNING id, title, description",
        )
        .bind(&new.title)
        .bind(&new.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::from)?;
        tx.commit().await?;
        Ok(course)
    }

    /// insert_enrollment
    ///
    /// Transactional single-row insert. The UNIQUE (student_id, course_id)
    /// constraint rejects double enrollment; the foreign keys reject ids that
    /// do not reference an existing student/course. Both roll back.
    async fn insert_enrollment(&self, new: NewEnrollment) -> Result<Enrollment, AppError> {
        let mut tx = self.pool.begin().await?;
        let enrollment = sqlx::query_as::<_, Enrollment>(
            "INSERT INTO enrollments (student_id, course_id) VALUES (?, ?) \
             RETURNING id, student_id, course_id, enrollment_date",
        )
        .bind(new.student_id)
        .bind(new.course_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            map_conflict(
                e,
                "that student is already enrolled in that course",
                "no student or course with that id exists",
            )
        })?;
        tx.commit().await?;
        Ok(enrollment)
    }

    /// list_all
    ///
    /// Pure read: three full table scans ordered by insertion (primary key).
    async fn list_all(&self) -> Result<Listing, AppError> {
        let students =
            sqlx::query_as::<_, Student>("SELECT id, name, email FROM students ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        let courses =
            sqlx::query_as::<_, Course>("SELECT id, title, description FROM courses ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        let enrollments = sqlx::query_as::<_, Enrollment>(
            "SELECT id, student_id, course_id, enrollment_date FROM enrollments ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(Listing {
            students,
            courses,
            enrollments,
        })
    }
}
