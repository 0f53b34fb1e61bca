use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use enrollment_common::Transition;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::admin::*;
use crate::models::course::{TermResponse, term_responses};
use crate::models::shared::{Pagination, page_params, validate_id};
use crate::services::{CatalogService, SettingsService, StudentService, UnavailableTermsService};
use crate::state::AppState;
use crate::utils::permission::{COURSE_MANAGE, SETTINGS_MANAGE, STUDENT_MANAGE};

#[utoipa::path(
    get,
    path = "/students",
    tag = "Admin",
    operation_id = "listStudents",
    summary = "List students",
    description = "Returns a paginated list of students ordered by surname, optionally filtered by activation state or a search term. Requires `student:manage` permission.",
    params(StudentListQuery),
    responses(
        (status = 200, description = "Students", body = StudentListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_students(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<StudentListQuery>,
) -> Result<Json<StudentListResponse>, AppError> {
    auth_user.require_permission(STUDENT_MANAGE)?;

    let (page, per_page) = page_params(query.page, query.per_page);
    let (students, total) = StudentService::new(&state.db)
        .list(&query.filter(), page, per_page)
        .await?;

    Ok(Json(StudentListResponse {
        data: students.into_iter().map(Into::into).collect(),
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    post,
    path = "/students/{id}/reset",
    tag = "Admin",
    operation_id = "resetStudent",
    summary = "Reset a student to pending",
    description = "Sets the student's activation state back to pending. Requires `student:manage` permission.",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Updated student", body = StudentResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(admin_id = auth_user.student_id))]
pub async fn reset_student(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<StudentResponse>, AppError> {
    apply_transition(auth_user, state, id, Transition::Reset).await
}

#[utoipa::path(
    post,
    path = "/students/{id}/promote",
    tag = "Admin",
    operation_id = "promoteStudent",
    summary = "Promote a student",
    description = "Moves the student one activation state up: pending to active, active to promoted. Promoted students stay promoted. Requires `student:manage` permission.",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Updated student", body = StudentResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(admin_id = auth_user.student_id))]
pub async fn promote_student(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<StudentResponse>, AppError> {
    apply_transition(auth_user, state, id, Transition::Promote).await
}

#[utoipa::path(
    post,
    path = "/students/{id}/demote",
    tag = "Admin",
    operation_id = "demoteStudent",
    summary = "Demote a student",
    description = "Moves the student one activation state down. Pending students stay pending. Requires `student:manage` permission.",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Updated student", body = StudentResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(admin_id = auth_user.student_id))]
pub async fn demote_student(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<StudentResponse>, AppError> {
    apply_transition(auth_user, state, id, Transition::Demote).await
}

async fn apply_transition(
    auth_user: AuthUser,
    state: AppState,
    id: i32,
    transition: Transition,
) -> Result<Json<StudentResponse>, AppError> {
    auth_user.require_permission(STUDENT_MANAGE)?;
    validate_id(id, "Student")?;

    let student = StudentService::new(&state.db)
        .transition(id, transition)
        .await?;
    Ok(Json(student.into()))
}

#[utoipa::path(
    delete,
    path = "/courses/{id}",
    tag = "Admin",
    operation_id = "deleteCourse",
    summary = "Delete a course",
    description = "Deletes the course together with its terms, every selection of those terms and all enrollments. Requires `course:manage` permission.",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course deleted", body = DeleteSummaryResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(admin_id = auth_user.student_id))]
pub async fn delete_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DeleteSummaryResponse>, AppError> {
    auth_user.require_permission(COURSE_MANAGE)?;
    validate_id(id, "Course")?;

    let summary = CatalogService::new(&state.db).delete_course(id).await?;
    Ok(Json(summary.into()))
}

#[utoipa::path(
    get,
    path = "/terms",
    tag = "Admin",
    operation_id = "listTerms",
    summary = "List terms",
    description = "Returns all terms, or those of one course. Requires `course:manage` permission.",
    params(TermListQuery),
    responses(
        (status = 200, description = "Terms", body = Vec<TermResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_terms(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<TermListQuery>,
) -> Result<Json<Vec<TermResponse>>, AppError> {
    auth_user.require_permission(COURSE_MANAGE)?;

    let catalog = CatalogService::new(&state.db);
    let terms = match query.course_id {
        Some(course_id) => {
            validate_id(course_id, "Course")?;
            catalog.find_course(course_id).await?;
            catalog.course_terms(course_id).await?
        }
        None => catalog.all_terms().await?,
    };

    Ok(Json(term_responses(catalog.term_details(terms).await?)?))
}

#[utoipa::path(
    delete,
    path = "/terms/{id}",
    tag = "Admin",
    operation_id = "deleteTerm",
    summary = "Delete a term",
    description = "Deletes one term and every selection of it. The course and its other terms are untouched. Requires `course:manage` permission.",
    params(("id" = i32, Path, description = "Term ID")),
    responses(
        (status = 200, description = "Term deleted", body = DeleteSummaryResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Term not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(admin_id = auth_user.student_id))]
pub async fn delete_term(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DeleteSummaryResponse>, AppError> {
    auth_user.require_permission(COURSE_MANAGE)?;
    validate_id(id, "Term")?;

    let summary = CatalogService::new(&state.db).delete_term(id).await?;
    Ok(Json(summary.into()))
}

#[utoipa::path(
    post,
    path = "/import",
    tag = "Admin",
    operation_id = "importSchedule",
    summary = "Import a schedule",
    description = "Loads courses and their terms. Existing courses, locations, instructors and identical terms are reused. Nothing is stored if any entry is invalid. Requires `course:manage` permission.",
    request_body = ImportRequest,
    responses(
        (status = 200, description = "Import summary", body = ImportSummaryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(
    skip(state, auth_user, payload),
    fields(admin_id = auth_user.student_id, courses = payload.courses.len())
)]
pub async fn import_schedule(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ImportRequest>,
) -> Result<Json<ImportSummaryResponse>, AppError> {
    auth_user.require_permission(COURSE_MANAGE)?;

    let courses = payload.into_courses()?;
    let summary = CatalogService::new(&state.db).import(&courses).await?;
    Ok(Json(summary.into()))
}

#[utoipa::path(
    get,
    path = "/unavailable-terms",
    tag = "Admin",
    operation_id = "listUnavailableTerms",
    summary = "List unavailable-term sets",
    description = "Requires `course:manage` permission.",
    responses(
        (status = 200, description = "Sets", body = Vec<UnavailableSelectionResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_unavailable_terms(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<UnavailableSelectionResponse>>, AppError> {
    auth_user.require_permission(COURSE_MANAGE)?;

    let sets = UnavailableTermsService::new(&state.db).list().await?;
    Ok(Json(sets.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/unavailable-terms",
    tag = "Admin",
    operation_id = "createUnavailableTerms",
    summary = "Create an unavailable-term set",
    description = "Marks the listed terms as unavailable under a name. Requires `course:manage` permission.",
    request_body = UnavailableTermsRequest,
    responses(
        (status = 201, description = "Set created", body = UnavailableSelectionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Term not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_unavailable_terms(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UnavailableTermsRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission(COURSE_MANAGE)?;
    validate_unavailable_terms_request(&payload)?;

    let saved = UnavailableTermsService::new(&state.db)
        .save(None, payload.name.trim(), &payload.term_ids)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(UnavailableSelectionResponse::from(saved)),
    ))
}

#[utoipa::path(
    get,
    path = "/unavailable-terms/{id}",
    tag = "Admin",
    operation_id = "getUnavailableTerms",
    summary = "Get an unavailable-term set",
    description = "Requires `course:manage` permission.",
    params(("id" = i32, Path, description = "Set ID")),
    responses(
        (status = 200, description = "Set", body = UnavailableSelectionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Set not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_unavailable_terms(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UnavailableSelectionResponse>, AppError> {
    auth_user.require_permission(COURSE_MANAGE)?;
    validate_id(id, "Set")?;

    let set = UnavailableTermsService::new(&state.db).get(id).await?;
    Ok(Json(set.into()))
}

#[utoipa::path(
    put,
    path = "/unavailable-terms/{id}",
    tag = "Admin",
    operation_id = "updateUnavailableTerms",
    summary = "Replace an unavailable-term set",
    description = "Replaces the name and the term list of the set. Requires `course:manage` permission.",
    params(("id" = i32, Path, description = "Set ID")),
    request_body = UnavailableTermsRequest,
    responses(
        (status = 200, description = "Set updated", body = UnavailableSelectionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Set or term not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn update_unavailable_terms(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UnavailableTermsRequest>,
) -> Result<Json<UnavailableSelectionResponse>, AppError> {
    auth_user.require_permission(COURSE_MANAGE)?;
    validate_id(id, "Set")?;
    validate_unavailable_terms_request(&payload)?;

    let saved = UnavailableTermsService::new(&state.db)
        .save(Some(id), payload.name.trim(), &payload.term_ids)
        .await?;
    Ok(Json(saved.into()))
}

#[utoipa::path(
    get,
    path = "/settings",
    tag = "Admin",
    operation_id = "getSettings",
    summary = "Get settings",
    description = "Requires `settings:manage` permission.",
    responses(
        (status = 200, description = "Settings", body = SettingsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_settings(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<SettingsResponse>, AppError> {
    auth_user.require_permission(SETTINGS_MANAGE)?;

    let settings = SettingsService::new(&state.db).get().await?;
    Ok(Json(settings.into()))
}

#[utoipa::path(
    patch,
    path = "/settings",
    tag = "Admin",
    operation_id = "updateSettings",
    summary = "Update settings",
    description = "Opens or closes registration and term selection. Omitted fields keep their value. Requires `settings:manage` permission.",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Updated settings", body = SettingsResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_settings(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateSettingsRequest>,
) -> Result<Json<SettingsResponse>, AppError> {
    auth_user.require_permission(SETTINGS_MANAGE)?;

    let settings = SettingsService::new(&state.db)
        .update(payload.into())
        .await?;
    tracing::info!(
        registration_open = settings.registration_open,
        selections_open = settings.selections_open,
        "Updated settings"
    );
    Ok(Json(settings.into()))
}
