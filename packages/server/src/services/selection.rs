use std::collections::{HashMap, HashSet};

use chrono::Utc;
use enrollment_common::{POINT_BUDGET, TermKind, choosable_points_total, validate_points};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionSession, TransactionTrait,
};
use tracing::{debug, info};

use crate::entity::{term, term_selection};
use crate::services::catalog::CatalogService;
use crate::services::error::ServiceError;
use crate::services::student::StudentService;

/// Longest comment a student may attach to a selection.
pub const MAX_COMMENT_CHARS: usize = 256;

/// One entry of a batch submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEntry {
    pub term_id: i32,
    pub points: i32,
    pub comment: String,
}

pub struct SelectionService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> SelectionService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Insert the (student, term) selection or overwrite its points and comment.
    ///
    /// Does not check the point budget; callers validate the whole batch first.
    pub async fn create_or_update(
        &self,
        student_id: i32,
        term_id: i32,
        points: i32,
        comment: &str,
    ) -> Result<term_selection::Model, ServiceError> {
        StudentService::new(self.conn).find(student_id).await?;
        CatalogService::new(self.conn).find_term(term_id).await?;

        let now = Utc::now();
        let existing = term_selection::Entity::find_by_id((student_id, term_id))
            .one(self.conn)
            .await?;

        let model = match existing {
            Some(existing) => {
                let mut active: term_selection::ActiveModel = existing.into();
                active.points = Set(points);
                active.comment = Set(comment.to_string());
                active.updated_at = Set(now);
                active.update(self.conn).await?
            }
            None => {
                term_selection::ActiveModel {
                    student_id: Set(student_id),
                    term_id: Set(term_id),
                    points: Set(points),
                    comment: Set(comment.to_string()),
                    updated_at: Set(now),
                }
                .insert(self.conn)
                .await?
            }
        };
        Ok(model)
    }

    /// The student's selections for terms of one course, by term id.
    pub async fn course_selections(
        &self,
        student_id: i32,
        course_id: i32,
    ) -> Result<Vec<term_selection::Model>, DbErr> {
        let term_ids: Vec<i32> = CatalogService::new(self.conn)
            .course_terms(course_id)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();
        if term_ids.is_empty() {
            return Ok(Vec::new());
        }
        term_selection::Entity::find()
            .filter(term_selection::Column::StudentId.eq(student_id))
            .filter(term_selection::Column::TermId.is_in(term_ids))
            .order_by_asc(term_selection::Column::TermId)
            .all(self.conn)
            .await
    }
}

impl<'a, C: ConnectionTrait + TransactionTrait> SelectionService<'a, C> {
    /// Validate and persist a batch of selections for one course.
    ///
    /// The budget is checked on the student's stored selections for the course
    /// overlaid with the batch, so repeated partial submissions cannot exceed it.
    /// Nothing is written unless the whole batch passes.
    pub async fn submit(
        &self,
        student_id: i32,
        course_id: i32,
        entries: &[SelectionEntry],
    ) -> Result<Vec<term_selection::Model>, ServiceError> {
        let txn = self.conn.begin().await?;
        let students = StudentService::new(&txn);
        let catalog = CatalogService::new(&txn);
        let selections = SelectionService::new(&txn);

        students.find(student_id).await?;
        catalog.find_course(course_id).await?;
        if !students.has_joined_course(student_id, course_id).await? {
            return Err(ServiceError::Invalid(format!(
                "Student has not joined course {course_id}"
            )));
        }

        let course_terms = catalog.course_terms(course_id).await?;
        check_entries(&catalog, course_id, &course_terms, entries).await?;

        let mut proposed: HashMap<i32, i32> = selections
            .course_selections(student_id, course_id)
            .await?
            .into_iter()
            .map(|s| (s.term_id, s.points))
            .collect();
        proposed.extend(entries.iter().map(|e| (e.term_id, e.points)));

        let choosable: Vec<i32> = course_terms
            .iter()
            .filter(|t| t.kind == TermKind::Lab.code())
            .map(|t| t.id)
            .collect();
        if !validate_points(&choosable, &proposed) {
            let total = choosable_points_total(&choosable, &proposed);
            debug!(student_id, course_id, total, "Rejected selections over budget");
            return Err(ServiceError::PointBudgetExceeded {
                course_id,
                total,
                budget: POINT_BUDGET,
            });
        }

        let mut saved = Vec::with_capacity(entries.len());
        for entry in entries {
            saved.push(
                selections
                    .create_or_update(student_id, entry.term_id, entry.points, &entry.comment)
                    .await?,
            );
        }

        txn.commit().await?;
        info!(student_id, course_id, count = saved.len(), "Saved term selections");
        Ok(saved)
    }
}

/// Reject duplicates, negative points, long comments and terms of other courses.
async fn check_entries<C: ConnectionTrait>(
    catalog: &CatalogService<'_, C>,
    course_id: i32,
    course_terms: &[term::Model],
    entries: &[SelectionEntry],
) -> Result<(), ServiceError> {
    let course_term_ids: HashSet<i32> = course_terms.iter().map(|t| t.id).collect();
    let mut seen = HashSet::new();

    for entry in entries {
        if !seen.insert(entry.term_id) {
            return Err(ServiceError::Invalid(format!(
                "Duplicate term {} in submission",
                entry.term_id
            )));
        }
        if entry.points < 0 {
            return Err(ServiceError::Invalid(format!(
                "Points for term {} must not be negative",
                entry.term_id
            )));
        }
        if entry.comment.chars().count() > MAX_COMMENT_CHARS {
            return Err(ServiceError::Invalid(format!(
                "Comment must be at most {MAX_COMMENT_CHARS} characters"
            )));
        }
        if !course_term_ids.contains(&entry.term_id) {
            // Unknown terms are NotFound; terms of another course are a bad request.
            catalog.find_term(entry.term_id).await?;
            return Err(ServiceError::Invalid(format!(
                "Term {} does not belong to course {course_id}",
                entry.term_id
            )));
        }
    }
    Ok(())
}
