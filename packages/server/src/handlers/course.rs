use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use enrollment_common::{POINT_BUDGET, choosable_points_total};
use sea_orm::ConnectionTrait;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::course::*;
use crate::models::shared::validate_id;
use crate::services::selection::SelectionEntry;
use crate::services::{CatalogService, SelectionService, SettingsService, StudentService};
use crate::state::AppState;
use crate::utils::permission::{COURSE_JOIN, SELECTION_SUBMIT};

#[utoipa::path(
    get,
    path = "/courses",
    tag = "Courses",
    operation_id = "listCourses",
    summary = "List courses",
    description = "Returns every course ordered by name, flagging the ones the caller has joined.",
    responses(
        (status = 200, description = "Courses", body = Vec<CourseListItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(student_id = auth_user.student_id))]
pub async fn list_courses(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseListItem>>, AppError> {
    let courses = CatalogService::new(&state.db).list_courses().await?;
    let joined = StudentService::new(&state.db)
        .joined_course_ids(auth_user.student_id)
        .await?;

    Ok(Json(
        courses
            .into_iter()
            .map(|c| CourseListItem {
                joined: joined.contains(&c.id),
                id: c.id,
                name: c.name,
            })
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/courses/{id}",
    tag = "Courses",
    operation_id = "getCourse",
    summary = "Get course details",
    description = "Returns the course with all of its terms and instructors.",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course details", body = CourseDetailResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(student_id = auth_user.student_id))]
pub async fn get_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CourseDetailResponse>, AppError> {
    validate_id(id, "Course")?;

    let catalog = CatalogService::new(&state.db);
    let course = catalog.find_course(id).await?;
    let terms = catalog.term_details(catalog.course_terms(id).await?).await?;
    let instructors = catalog.course_instructors(id).await?;
    let joined = StudentService::new(&state.db)
        .has_joined_course(auth_user.student_id, id)
        .await?;

    Ok(Json(CourseDetailResponse {
        id: course.id,
        name: course.name,
        joined,
        terms: term_responses(terms)?,
        instructors: instructors.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/courses/{id}/choosable-terms",
    tag = "Courses",
    operation_id = "listChoosableTerms",
    summary = "List choosable terms",
    description = "Returns the lab terms of the course, ordered by day of week and start time. Only these terms count against the point budget.",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Lab terms", body = Vec<TermResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn choosable_terms(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<TermResponse>>, AppError> {
    validate_id(id, "Course")?;

    let catalog = CatalogService::new(&state.db);
    catalog.find_course(id).await?;
    let terms = catalog.term_details(catalog.choosable_terms(id).await?).await?;

    Ok(Json(term_responses(terms)?))
}

#[utoipa::path(
    post,
    path = "/courses/{id}/join",
    tag = "Courses",
    operation_id = "joinCourse",
    summary = "Join a course",
    description = "Enrolls the caller in the course. Joining twice is not an error. Requires `course:join` permission.",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Enrolled", body = JoinResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(student_id = auth_user.student_id))]
pub async fn join_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<JoinResponse>, AppError> {
    auth_user.require_permission(COURSE_JOIN)?;
    validate_id(id, "Course")?;

    let changed = StudentService::new(&state.db)
        .join_course(auth_user.student_id, id)
        .await?;

    Ok(Json(JoinResponse {
        course_id: id,
        joined: true,
        changed,
    }))
}

#[utoipa::path(
    delete,
    path = "/courses/{id}/join",
    tag = "Courses",
    operation_id = "leaveCourse",
    summary = "Leave a course",
    description = "Removes the caller's enrollment and their selections for the course's terms. Requires `course:join` permission.",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Left the course", body = JoinResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(student_id = auth_user.student_id))]
pub async fn leave_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<JoinResponse>, AppError> {
    auth_user.require_permission(COURSE_JOIN)?;
    validate_id(id, "Course")?;

    let changed = StudentService::new(&state.db)
        .leave_course(auth_user.student_id, id)
        .await?;

    Ok(Json(JoinResponse {
        course_id: id,
        joined: false,
        changed,
    }))
}

#[utoipa::path(
    get,
    path = "/courses/{id}/selections",
    tag = "Selections",
    operation_id = "getSelections",
    summary = "Get the caller's selections",
    description = "Returns the caller's term selections for the course and how much of the lab point budget they use. Requires `selection:submit` permission.",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Selections", body = CourseSelectionsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(student_id = auth_user.student_id))]
pub async fn get_selections(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CourseSelectionsResponse>, AppError> {
    auth_user.require_permission(SELECTION_SUBMIT)?;
    validate_id(id, "Course")?;

    CatalogService::new(&state.db).find_course(id).await?;
    Ok(Json(
        selections_response(&state.db, auth_user.student_id, id).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/courses/{id}/selections",
    tag = "Selections",
    operation_id = "submitSelections",
    summary = "Submit term selections",
    description = "Creates or updates the caller's selections for terms of the course. The batch is rejected as a whole when the lab terms would receive more than 15 points in total, counting selections already stored. Requires `selection:submit` permission and a joined course.",
    params(("id" = i32, Path, description = "Course ID")),
    request_body = SubmitSelectionsRequest,
    responses(
        (status = 200, description = "Selections saved", body = CourseSelectionsResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR, POINT_BUDGET_EXCEEDED)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED, SELECTIONS_CLOSED)", body = ErrorBody),
        (status = 404, description = "Course or term not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(
    skip(state, auth_user, payload),
    fields(student_id = auth_user.student_id, count = payload.selections.len())
)]
pub async fn submit_selections(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<SubmitSelectionsRequest>,
) -> Result<Json<CourseSelectionsResponse>, AppError> {
    auth_user.require_permission(SELECTION_SUBMIT)?;
    validate_id(id, "Course")?;
    validate_submit_selections(&payload)?;

    if !SettingsService::new(&state.db).get().await?.selections_open {
        return Err(AppError::SelectionsClosed);
    }

    let entries: Vec<SelectionEntry> = payload.selections.into_iter().map(Into::into).collect();
    SelectionService::new(&state.db)
        .submit(auth_user.student_id, id, &entries)
        .await?;

    Ok(Json(
        selections_response(&state.db, auth_user.student_id, id).await?,
    ))
}

async fn selections_response<C: ConnectionTrait>(
    conn: &C,
    student_id: i32,
    course_id: i32,
) -> Result<CourseSelectionsResponse, AppError> {
    let selections = SelectionService::new(conn)
        .course_selections(student_id, course_id)
        .await?;
    let choosable = CatalogService::new(conn)
        .choosable_term_ids(course_id)
        .await?;
    let allocated: HashMap<i32, i32> = selections.iter().map(|s| (s.term_id, s.points)).collect();

    Ok(CourseSelectionsResponse {
        course_id,
        budget: POINT_BUDGET,
        lab_points_used: choosable_points_total(&choosable, &allocated),
        selections: selections.into_iter().map(Into::into).collect(),
    })
}
