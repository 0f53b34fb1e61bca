use chrono::{DateTime, Utc};
use enrollment_common::{ActivationState, DayOfWeek, TermKind};
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, parse_time, validate_bulk_ids, validate_name};
use crate::entity::{settings, student};
use crate::entity::location::DEFAULT_CAPACITY;
use crate::error::AppError;
use crate::services::catalog::{
    DeleteSummary, ImportCourse, ImportInstructor, ImportSummary, ImportTerm,
};
use crate::services::settings::SettingsUpdate;
use crate::services::student::StudentFilter;
use crate::services::unavailable::UnavailableSelection;

/// Query parameters for listing students.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct StudentListQuery {
    /// Page number (1-indexed).
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Items per page (1-100, default 20).
    #[param(example = 20)]
    pub per_page: Option<u64>,
    /// Substring of name or surname, or an exact index.
    #[param(example = "kowal")]
    pub search: Option<String>,
    /// Only students in this activation state.
    pub activation: Option<ActivationState>,
}

impl StudentListQuery {
    pub fn filter(&self) -> StudentFilter {
        StudentFilter {
            search: self.search.clone(),
            activation: self.activation,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StudentResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = 212345)]
    pub index: i32,
    pub name: String,
    pub surname: String,
    pub group_id: i32,
    pub activation: ActivationState,
    pub created_at: DateTime<Utc>,
}

impl From<student::Model> for StudentResponse {
    fn from(m: student::Model) -> Self {
        Self {
            activation: m.activation(),
            id: m.id,
            index: m.index,
            name: m.name,
            surname: m.surname,
            group_id: m.group_id,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StudentListResponse {
    pub data: Vec<StudentResponse>,
    pub pagination: Pagination,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DeleteSummaryResponse {
    pub terms_deleted: u64,
    pub selections_deleted: u64,
    pub enrollments_deleted: u64,
}

impl From<DeleteSummary> for DeleteSummaryResponse {
    fn from(s: DeleteSummary) -> Self {
        Self {
            terms_deleted: s.terms_deleted,
            selections_deleted: s.selections_deleted,
            enrollments_deleted: s.enrollments_deleted,
        }
    }
}

/// Query parameters for the administrative term list.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct TermListQuery {
    /// Only terms of this course.
    #[param(example = 1)]
    pub course_id: Option<i32>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ImportInstructorRequest {
    #[schema(example = "dr Jan Nowak")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "jan.nowak@example.edu")]
    pub email: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ImportLocationRequest {
    #[schema(example = "C-3 201")]
    pub name: String,
    /// Seats; defaults to 15 for new locations.
    pub capacity: Option<i32>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ImportTermRequest {
    /// Kind label as used in schedule exports.
    #[schema(example = "Lab.")]
    pub kind: String,
    /// Day label: `M`, `T`, `W`, `Th` or `F`.
    #[schema(example = "M")]
    pub day: String,
    #[schema(example = "08:15")]
    pub starts_at: String,
    #[schema(example = "10:00")]
    pub ends_at: String,
    pub location: ImportLocationRequest,
    #[serde(default)]
    pub instructors: Vec<ImportInstructorRequest>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ImportCourseRequest {
    #[schema(example = "Algorithms")]
    pub name: String,
    #[serde(default)]
    pub terms: Vec<ImportTermRequest>,
}

/// A schedule to load into the catalog.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ImportRequest {
    pub courses: Vec<ImportCourseRequest>,
}

impl ImportRequest {
    /// Validate labels, times and names, producing the service input.
    pub fn into_courses(self) -> Result<Vec<ImportCourse>, AppError> {
        if self.courses.is_empty() {
            return Err(AppError::Validation("Schedule has no courses".into()));
        }
        self.courses
            .into_iter()
            .map(|course| -> Result<ImportCourse, AppError> {
                validate_name(&course.name, "Course name")?;
                let terms = course
                    .terms
                    .into_iter()
                    .map(import_term)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ImportCourse {
                    name: course.name.trim().to_string(),
                    terms,
                })
            })
            .collect()
    }
}

fn import_term(t: ImportTermRequest) -> Result<ImportTerm, AppError> {
    let kind: TermKind = t
        .kind
        .trim()
        .parse()
        .map_err(|e: enrollment_common::LookupError| AppError::Validation(e.to_string()))?;
    let day: DayOfWeek = t
        .day
        .trim()
        .parse()
        .map_err(|e: enrollment_common::LookupError| AppError::Validation(e.to_string()))?;
    let starts_at = parse_time(&t.starts_at, "starts_at")?;
    let ends_at = parse_time(&t.ends_at, "ends_at")?;
    if ends_at <= starts_at {
        return Err(AppError::Validation(format!(
            "Term must end after it starts ({} - {})",
            t.starts_at.trim(),
            t.ends_at.trim()
        )));
    }

    validate_name(&t.location.name, "Location name")?;
    let capacity = t.location.capacity.unwrap_or(DEFAULT_CAPACITY);
    if capacity <= 0 {
        return Err(AppError::Validation(
            "Location capacity must be positive".into(),
        ));
    }

    let instructors = t
        .instructors
        .into_iter()
        .map(|i| -> Result<ImportInstructor, AppError> {
            validate_name(&i.name, "Instructor name")?;
            Ok(ImportInstructor {
                name: i.name.trim().to_string(),
                email: i.email.trim().to_string(),
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    Ok(ImportTerm {
        kind,
        day,
        starts_at,
        ends_at,
        location_name: t.location.name.trim().to_string(),
        location_capacity: capacity,
        instructors,
    })
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ImportSummaryResponse {
    pub courses_created: u32,
    pub courses_reused: u32,
    pub terms_created: u32,
    pub terms_reused: u32,
    pub locations_created: u32,
    pub instructors_created: u32,
    pub instructor_links_created: u32,
}

impl From<ImportSummary> for ImportSummaryResponse {
    fn from(s: ImportSummary) -> Self {
        Self {
            courses_created: s.courses_created,
            courses_reused: s.courses_reused,
            terms_created: s.terms_created,
            terms_reused: s.terms_reused,
            locations_created: s.locations_created,
            instructors_created: s.instructors_created,
            instructor_links_created: s.instructor_links_created,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UnavailableTermsRequest {
    #[schema(example = "Rector's day")]
    pub name: String,
    #[schema(example = json!([3, 4]))]
    pub term_ids: Vec<i32>,
}

pub fn validate_unavailable_terms_request(req: &UnavailableTermsRequest) -> Result<(), AppError> {
    validate_name(&req.name, "Name")?;
    validate_bulk_ids(&req.term_ids, "term", 500)
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UnavailableSelectionResponse {
    pub id: i32,
    pub name: String,
    pub term_ids: Vec<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UnavailableSelection> for UnavailableSelectionResponse {
    fn from(s: UnavailableSelection) -> Self {
        Self {
            id: s.selection.id,
            name: s.selection.name,
            term_ids: s.term_ids,
            created_at: s.selection.created_at,
            updated_at: s.selection.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SettingsResponse {
    pub registration_open: bool,
    pub selections_open: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<settings::Model> for SettingsResponse {
    fn from(m: settings::Model) -> Self {
        Self {
            registration_open: m.registration_open,
            selections_open: m.selections_open,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateSettingsRequest {
    pub registration_open: Option<bool>,
    pub selections_open: Option<bool>,
}

impl From<UpdateSettingsRequest> for SettingsUpdate {
    fn from(req: UpdateSettingsRequest) -> Self {
        Self {
            registration_open: req.registration_open,
            selections_open: req.selections_open,
        }
    }
}
