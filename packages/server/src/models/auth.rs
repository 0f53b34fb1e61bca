use enrollment_common::ActivationState;
use serde::{Deserialize, Serialize};

use super::shared::validate_name;
use crate::error::AppError;
use crate::services::student::NewStudent;

/// Request body for student registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Student number (positive).
    #[schema(example = 212345)]
    pub index: i32,
    #[schema(example = "Anna")]
    pub name: String,
    #[schema(example = "Kowalska")]
    pub surname: String,
    /// Dean's group the student belongs to.
    #[schema(example = 3)]
    pub group_id: i32,
    /// Password (8-128 characters).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    if payload.index <= 0 {
        return Err(AppError::Validation("Index must be a positive integer".into()));
    }
    validate_name(&payload.name, "Name")?;
    validate_name(&payload.surname, "Surname")?;
    if payload.group_id < 0 {
        return Err(AppError::Validation("Group must not be negative".into()));
    }
    if payload.password.len() < 8 || payload.password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}

impl From<RegisterRequest> for NewStudent {
    fn from(req: RegisterRequest) -> Self {
        Self {
            index: req.index,
            name: req.name.trim().to_string(),
            surname: req.surname.trim().to_string(),
            group_id: req.group_id,
            password: req.password,
        }
    }
}

/// Request body for student login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = 212345)]
    pub index: i32,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.index <= 0 {
        return Err(AppError::Validation("Index must be a positive integer".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Successful registration response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RegisterResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = 212345)]
    pub index: i32,
    /// Always `pending` until an administrator activates the account.
    pub activation: ActivationState,
}

impl From<crate::entity::student::Model> for RegisterResponse {
    fn from(student: crate::entity::student::Model) -> Self {
        Self {
            id: student.id,
            index: student.index,
            activation: student.activation(),
        }
    }
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// JWT bearer token.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    #[schema(example = 42)]
    pub student_id: i32,
    #[schema(example = 212345)]
    pub index: i32,
    pub activation: ActivationState,
    #[schema(example = json!(["course:join", "selection:submit"]))]
    pub permissions: Vec<String>,
}

/// Current student's profile.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    pub id: i32,
    pub index: i32,
    pub name: String,
    pub surname: String,
    pub group_id: i32,
    pub activation: ActivationState,
    pub permissions: Vec<String>,
    /// Ids of the courses the student has joined.
    pub joined_course_ids: Vec<i32>,
}
