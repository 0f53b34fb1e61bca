use chrono::{DateTime, Utc};
use enrollment_common::{DayOfWeek, LookupError, TermKind};
use serde::{Deserialize, Serialize};

use super::shared::format_time;
use crate::entity::{instructor, location, term_selection};
use crate::error::AppError;
use crate::services::catalog::TermDetails;
use crate::services::error::ServiceError;
use crate::services::selection::{MAX_COMMENT_CHARS, SelectionEntry};

#[derive(Serialize, utoipa::ToSchema)]
pub struct CourseListItem {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Algorithms")]
    pub name: String,
    /// Whether the caller has joined this course.
    pub joined: bool,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct InstructorResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
}

impl From<instructor::Model> for InstructorResponse {
    fn from(m: instructor::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LocationResponse {
    pub id: i32,
    pub name: String,
    pub capacity: i32,
}

impl From<location::Model> for LocationResponse {
    fn from(m: location::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            capacity: m.capacity,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TermResponse {
    pub id: i32,
    pub course_id: i32,
    pub kind: TermKind,
    #[schema(example = "Laboratorium")]
    pub type_name: String,
    pub day_of_week: DayOfWeek,
    #[schema(example = "Poniedziałek")]
    pub day_name: String,
    #[schema(example = "08:15")]
    pub starts_at: String,
    #[schema(example = "10:00")]
    pub ends_at: String,
    pub location: LocationResponse,
    pub instructors: Vec<InstructorResponse>,
    /// Marked unavailable by an administrator.
    pub unavailable: bool,
}

impl TryFrom<TermDetails> for TermResponse {
    type Error = LookupError;

    fn try_from(d: TermDetails) -> Result<Self, Self::Error> {
        let kind = d.term.term_kind()?;
        let day = d.term.day()?;
        Ok(Self {
            id: d.term.id,
            course_id: d.term.course_id,
            kind,
            type_name: kind.display_name().to_string(),
            day_of_week: day,
            day_name: day.display_name().to_string(),
            starts_at: format_time(d.term.starts_at),
            ends_at: format_time(d.term.ends_at),
            location: d.location.into(),
            instructors: d.instructors.into_iter().map(Into::into).collect(),
            unavailable: d.unavailable,
        })
    }
}

/// Convert loaded terms, treating an unknown stored code as an internal error.
pub fn term_responses(details: Vec<TermDetails>) -> Result<Vec<TermResponse>, AppError> {
    details
        .into_iter()
        .map(|d| TermResponse::try_from(d).map_err(|e| AppError::from(ServiceError::from(e))))
        .collect()
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CourseDetailResponse {
    pub id: i32,
    pub name: String,
    pub joined: bool,
    pub terms: Vec<TermResponse>,
    /// Everyone teaching any term of the course.
    pub instructors: Vec<InstructorResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct JoinResponse {
    pub course_id: i32,
    pub joined: bool,
    /// False when the request did not change anything.
    pub changed: bool,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SelectionItem {
    #[schema(example = 12)]
    pub term_id: i32,
    #[schema(example = 8)]
    pub points: i32,
    #[serde(default)]
    #[schema(example = "Tuesdays work best")]
    pub comment: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SubmitSelectionsRequest {
    pub selections: Vec<SelectionItem>,
}

pub fn validate_submit_selections(req: &SubmitSelectionsRequest) -> Result<(), AppError> {
    if req.selections.is_empty() {
        return Err(AppError::Validation("Selections must not be empty".into()));
    }
    if req.selections.len() > 100 {
        return Err(AppError::Validation("Too many selections: max 100".into()));
    }
    for item in &req.selections {
        if item.term_id <= 0 {
            return Err(AppError::Validation(format!(
                "Invalid term ID: {}",
                item.term_id
            )));
        }
        if item.points < 0 {
            return Err(AppError::Validation("Points must not be negative".into()));
        }
        if item.comment.chars().count() > MAX_COMMENT_CHARS {
            return Err(AppError::Validation(format!(
                "Comment must be at most {MAX_COMMENT_CHARS} characters"
            )));
        }
    }
    Ok(())
}

impl From<SelectionItem> for SelectionEntry {
    fn from(item: SelectionItem) -> Self {
        Self {
            term_id: item.term_id,
            points: item.points,
            comment: item.comment.trim().to_string(),
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SelectionResponse {
    pub term_id: i32,
    pub points: i32,
    pub comment: String,
    pub updated_at: DateTime<Utc>,
}

impl From<term_selection::Model> for SelectionResponse {
    fn from(m: term_selection::Model) -> Self {
        Self {
            term_id: m.term_id,
            points: m.points,
            comment: m.comment,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CourseSelectionsResponse {
    pub course_id: i32,
    /// Points available for the lab terms of the course.
    #[schema(example = 15)]
    pub budget: i32,
    /// Points currently allocated to lab terms.
    #[schema(example = 12)]
    pub lab_points_used: i64,
    pub selections: Vec<SelectionResponse>,
}
