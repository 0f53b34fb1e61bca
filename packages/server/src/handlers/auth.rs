use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use enrollment_common::ActivationState;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::auth::{
    LoginRequest, LoginResponse, MeResponse, RegisterRequest, RegisterResponse,
    validate_login_request, validate_register_request,
};
use crate::services::error::is_unique_violation;
use crate::services::student::NewStudent;
use crate::services::{ServiceError, SettingsService, StudentService};
use crate::state::AppState;
use crate::utils::permission::permissions_for;
use crate::utils::{hash, jwt};

#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    operation_id = "register",
    summary = "Register a new student",
    description = "Creates a pending student account. An administrator must activate it before the student can log in.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Student registered", body = RegisterResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Registration closed (REGISTRATION_CLOSED)", body = ErrorBody),
        (status = 409, description = "Index already registered (INDEX_TAKEN)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(index = payload.index))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_request(&payload)?;

    if !SettingsService::new(&state.db).get().await?.registration_open {
        return Err(AppError::RegistrationClosed);
    }

    let students = StudentService::new(&state.db);
    if students.find_by_index(payload.index).await?.is_some() {
        return Err(AppError::IndexTaken);
    }

    let new = NewStudent::from(payload);
    let student = students
        .register(&new)
        .await
        .map_err(|e| match e {
            ServiceError::Database(ref db) if is_unique_violation(db) => {
                tracing::debug!("Registration race: unique constraint caught on insert");
                AppError::IndexTaken
            }
            other => AppError::from(other),
        })?;

    Ok((StatusCode::CREATED, Json(RegisterResponse::from(student))))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Log in with index and password",
    description = "Returns a JWT carrying the permissions of the student's activation state.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Wrong index or password (INVALID_CREDENTIALS)", body = ErrorBody),
        (status = 403, description = "Account pending activation (ACCOUNT_NOT_ACTIVATED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(index = payload.index))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_login_request(&payload)?;

    let student = StudentService::new(&state.db)
        .find_by_index(payload.index)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &student.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;
    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let activation = student.activation();
    if activation == ActivationState::Pending {
        return Err(AppError::AccountNotActivated);
    }

    let permissions = permissions_for(activation);
    let token = jwt::sign(
        student.id,
        student.index,
        permissions.clone(),
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_hours,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    Ok(Json(LoginResponse {
        token,
        student_id: student.id,
        index: student.index,
        activation,
        permissions,
    }))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    operation_id = "getCurrentStudent",
    summary = "Get the current student",
    description = "Returns the authenticated student's profile, current permissions and joined courses.",
    responses(
        (status = 200, description = "Current student", body = MeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Account no longer exists (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(student_id = auth_user.student_id))]
pub async fn me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MeResponse>, AppError> {
    let students = StudentService::new(&state.db);
    let student = students.find(auth_user.student_id).await?;

    let mut joined_course_ids: Vec<i32> = students
        .joined_course_ids(student.id)
        .await?
        .into_iter()
        .collect();
    joined_course_ids.sort_unstable();

    let activation = student.activation();
    Ok(Json(MeResponse {
        id: student.id,
        index: student.index,
        name: student.name,
        surname: student.surname,
        group_id: student.group_id,
        activation,
        permissions: permissions_for(activation),
        joined_course_ids,
    }))
}
