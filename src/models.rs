use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Represents an account record in the `users` table. Created on registration,
/// read on login, never updated or deleted in-app. The stored hash is an
/// argon2 PHC string; the plaintext password is never persisted.
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

/// Student
///
/// A student record from the `students` table. Email uniqueness is enforced
/// at the store level.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Course
///
/// A course record from the `courses` table. The description is optional.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
}

/// Enrollment
///
/// Associates one student with one course, unique per pair. The enrollment
/// date defaults to the current date at insert time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Enrollment {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub enrollment_date: NaiveDate,
}

/// Listing
///
/// The full contents of the domain store, as shown on the index page.
/// All three vectors are ordered by primary key.
#[derive(Debug, Clone, Serialize, Default)]
pub struct Listing {
    pub students: Vec<Student>,
    pub courses: Vec<Course>,
    pub enrollments: Vec<Enrollment>,
}

// --- Request Payloads (Form Schemas) ---

/// RegisterForm
///
/// Input payload for POST /register.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub password2: String,
}

/// LoginForm
///
/// Input payload for POST /login. The wire field names (`usuario`,
/// `contrasena`) are part of the external interface and are kept as-is.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoginForm {
    #[serde(rename = "usuario")]
    pub username: String,
    #[serde(rename = "contrasena")]
    pub password: String,
}

/// RecordForm
///
/// Input payload for POST /. The hidden `tipo` field selects the target
/// entity; the remaining fields are interpreted per entity. Everything
/// arrives as optional text and goes through `validate` before any insert.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RecordForm {
    pub tipo: Option<String>,
    pub nombre: Option<String>,
    pub correo: Option<String>,
    pub titulo: Option<String>,
    pub descripcion: Option<String>,
    pub estudiante_id: Option<String>,
    pub curso_id: Option<String>,
}

// --- Validated Insert Payloads ---

/// NewStudent
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
}

/// NewCourse
#[derive(Debug, Clone, PartialEq)]
pub struct NewCourse {
    pub title: String,
    pub description: Option<String>,
}

/// NewEnrollment
#[derive(Debug, Clone, PartialEq)]
pub struct NewEnrollment {
    pub student_id: i64,
    pub course_id: i64,
}

/// NewRecord
///
/// The validated outcome of a record entry submission, tagged by entity.
#[derive(Debug, Clone, PartialEq)]
pub enum NewRecord {
    Student(NewStudent),
    Course(NewCourse),
    Enrollment(NewEnrollment),
}

/// non_empty
///
/// HTML forms submit absent optional inputs as empty strings; treat a
/// whitespace-only value the same as a missing one.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RegisterForm {
    /// validate
    ///
    /// Checks the registration fields and returns the trimmed username plus
    /// the plaintext password for hashing. Uniqueness of the username is
    /// checked later, at the store level.
    pub fn validate(&self) -> Result<(String, String), AppError> {
        let username = self.username.trim();
        if username.is_empty() || self.password.is_empty() {
            return Err(AppError::Validation(
                "username and password are required".to_string(),
            ));
        }
        if self.password != self.password2 {
            return Err(AppError::Validation("passwords do not match".to_string()));
        }
        Ok((username.to_string(), self.password.clone()))
    }
}

impl RecordForm {
    /// validate
    ///
    /// Turns the raw form into a typed insert payload, or a `Validation`
    /// error naming the offending field. This is the explicit replacement for
    /// the raise-on-missing-field flow: no exceptions, just a tagged result.
    pub fn validate(self) -> Result<NewRecord, AppError> {
        let tipo = non_empty(self.tipo)
            .ok_or_else(|| AppError::Validation("unknown record type".to_string()))?;

        match tipo.as_str() {
            "estudiante" => {
                let name = non_empty(self.nombre);
                let email = non_empty(self.correo);
                match (name, email) {
                    (Some(name), Some(email)) => Ok(NewRecord::Student(NewStudent { name, email })),
                    _ => Err(AppError::Validation(
                        "name and email are required".to_string(),
                    )),
                }
            }
            "curso" => {
                let title = non_empty(self.titulo)
                    .ok_or_else(|| AppError::Validation("title is required".to_string()))?;
                Ok(NewRecord::Course(NewCourse {
                    title,
                    description: non_empty(self.descripcion),
                }))
            }
            "inscripcion" => {
                let student_id = non_empty(self.estudiante_id).ok_or_else(|| {
                    AppError::Validation("student id and course id are required".to_string())
                })?;
                let course_id = non_empty(self.curso_id).ok_or_else(|| {
                    AppError::Validation("student id and course id are required".to_string())
                })?;
                let parsed = student_id
                    .parse::<i64>()
                    .and_then(|s| course_id.parse::<i64>().map(|c| (s, c)));
                match parsed {
                    Ok((student_id, course_id)) => Ok(NewRecord::Enrollment(NewEnrollment {
                        student_id,
                        course_id,
                    })),
                    Err(_) => Err(AppError::Validation(
                        "student id and course id must be numeric".to_string(),
                    )),
                }
            }
            _ => Err(AppError::Validation("unknown record type".to_string())),
        }
    }
}
