use enrollment_common::LookupError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("Course {course_id}: {total} points proposed for lab terms, budget is {budget}")]
    PointBudgetExceeded {
        course_id: i32,
        total: i64,
        budget: i32,
    },

    #[error("{0}")]
    Invalid(String),

    #[error("Password hash error: {0}")]
    PasswordHash(String),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        ServiceError::NotFound { entity, id }
    }
}

/// True when the database rejected a write for breaking a unique constraint.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
