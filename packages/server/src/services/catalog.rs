use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::NaiveTime;
use enrollment_common::{DayOfWeek, TermKind, points};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, Insert, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionSession, TransactionTrait,
};
use tracing::info;

use crate::entity::{
    course, instructor, location, student_course, term, term_instructor, term_selection,
    unavailable_term,
};
use crate::services::error::ServiceError;

/// Attributes of a term to create. Codes are already resolved to enums.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTerm {
    pub course_id: i32,
    pub kind: TermKind,
    pub day: DayOfWeek,
    pub starts_at: NaiveTime,
    pub ends_at: NaiveTime,
    pub location_id: i32,
}

/// A term joined with what presentation needs alongside it.
#[derive(Debug, Clone)]
pub struct TermDetails {
    pub term: term::Model,
    pub location: location::Model,
    pub instructors: Vec<instructor::Model>,
    /// Whether any unavailable-terms selection contains this term.
    pub unavailable: bool,
}

/// Rows removed by a cascading delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteSummary {
    pub terms_deleted: u64,
    pub selections_deleted: u64,
    pub enrollments_deleted: u64,
}

#[derive(Debug, Clone)]
pub struct ImportInstructor {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct ImportTerm {
    pub kind: TermKind,
    pub day: DayOfWeek,
    pub starts_at: NaiveTime,
    pub ends_at: NaiveTime,
    pub location_name: String,
    pub location_capacity: i32,
    pub instructors: Vec<ImportInstructor>,
}

#[derive(Debug, Clone)]
pub struct ImportCourse {
    pub name: String,
    pub terms: Vec<ImportTerm>,
}

/// Counts of created versus reused records after a schedule import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub courses_created: u32,
    pub courses_reused: u32,
    pub terms_created: u32,
    pub terms_reused: u32,
    pub locations_created: u32,
    pub instructors_created: u32,
    pub instructor_links_created: u32,
}

/// Courses, terms, locations and instructors.
pub struct CatalogService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> CatalogService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Build an unsaved course.
    pub fn new_course(name: &str) -> course::ActiveModel {
        course::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        }
    }

    pub fn new_instructor(name: &str, email: &str) -> instructor::ActiveModel {
        instructor::ActiveModel {
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            ..Default::default()
        }
    }

    pub fn new_location(name: &str, capacity: i32) -> location::ActiveModel {
        location::ActiveModel {
            name: Set(name.to_string()),
            capacity: Set(capacity),
            ..Default::default()
        }
    }

    pub fn new_term(new: &NewTerm) -> term::ActiveModel {
        term::ActiveModel {
            kind: Set(new.kind.code()),
            day_of_week: Set(new.day.code()),
            starts_at: Set(new.starts_at),
            ends_at: Set(new.ends_at),
            course_id: Set(new.course_id),
            location_id: Set(new.location_id),
            ..Default::default()
        }
    }

    pub async fn find_course(&self, id: i32) -> Result<course::Model, ServiceError> {
        course::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Course", id))
    }

    pub async fn find_term(&self, id: i32) -> Result<term::Model, ServiceError> {
        term::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Term", id))
    }

    pub async fn list_courses(&self) -> Result<Vec<course::Model>, DbErr> {
        course::Entity::find()
            .order_by_asc(course::Column::Name)
            .all(self.conn)
            .await
    }

    /// Return the course with this name, inserting it first if there is none.
    /// The flag is true when the course was created by this call.
    pub async fn get_or_create_course(&self, name: &str) -> Result<(course::Model, bool), DbErr> {
        let lookup = || {
            course::Entity::find()
                .filter(course::Column::Name.eq(name))
                .one(self.conn)
        };
        if let Some(existing) = lookup().await? {
            return Ok((existing, false));
        }
        let created = insert_if_absent(
            course::Entity::insert(Self::new_course(name))
                .on_conflict(OnConflict::column(course::Column::Name).do_nothing().to_owned()),
            self.conn,
        )
        .await?;
        let model = lookup().await?.ok_or_else(|| vanished("Course", name))?;
        Ok((model, created))
    }

    /// Instructors are matched by name only; an existing record keeps its email.
    pub async fn get_or_create_instructor(
        &self,
        name: &str,
        email: &str,
    ) -> Result<(instructor::Model, bool), DbErr> {
        let lookup = || {
            instructor::Entity::find()
                .filter(instructor::Column::Name.eq(name))
                .one(self.conn)
        };
        if let Some(existing) = lookup().await? {
            return Ok((existing, false));
        }
        let created = insert_if_absent(
            instructor::Entity::insert(Self::new_instructor(name, email))
                .on_conflict(OnConflict::column(instructor::Column::Name).do_nothing().to_owned()),
            self.conn,
        )
        .await?;
        let model = lookup().await?.ok_or_else(|| vanished("Instructor", name))?;
        Ok((model, created))
    }

    /// Locations are matched by name only; an existing record keeps its capacity.
    pub async fn get_or_create_location(
        &self,
        name: &str,
        capacity: i32,
    ) -> Result<(location::Model, bool), DbErr> {
        let lookup = || {
            location::Entity::find()
                .filter(location::Column::Name.eq(name))
                .one(self.conn)
        };
        if let Some(existing) = lookup().await? {
            return Ok((existing, false));
        }
        let created = insert_if_absent(
            location::Entity::insert(Self::new_location(name, capacity))
                .on_conflict(OnConflict::column(location::Column::Name).do_nothing().to_owned()),
            self.conn,
        )
        .await?;
        let model = lookup().await?.ok_or_else(|| vanished("Location", name))?;
        Ok((model, created))
    }

    /// Reuse a term with identical course, kind, day, times and location.
    pub async fn get_or_create_term(&self, new: &NewTerm) -> Result<(term::Model, bool), DbErr> {
        let existing = term::Entity::find()
            .filter(term::Column::CourseId.eq(new.course_id))
            .filter(term::Column::Kind.eq(new.kind.code()))
            .filter(term::Column::DayOfWeek.eq(new.day.code()))
            .filter(term::Column::StartsAt.eq(new.starts_at))
            .filter(term::Column::EndsAt.eq(new.ends_at))
            .filter(term::Column::LocationId.eq(new.location_id))
            .one(self.conn)
            .await?;
        if let Some(existing) = existing {
            return Ok((existing, false));
        }
        let model = Self::new_term(new).insert(self.conn).await?;
        Ok((model, true))
    }

    /// Link an instructor to a term. Returns false if the link already existed.
    pub async fn assign_instructor(&self, term_id: i32, instructor_id: i32) -> Result<bool, DbErr> {
        if term_instructor::Entity::find_by_id((term_id, instructor_id))
            .one(self.conn)
            .await?
            .is_some()
        {
            return Ok(false);
        }
        term_instructor::ActiveModel {
            term_id: Set(term_id),
            instructor_id: Set(instructor_id),
        }
        .insert(self.conn)
        .await?;
        Ok(true)
    }

    pub async fn course_terms(&self, course_id: i32) -> Result<Vec<term::Model>, DbErr> {
        term::Entity::find()
            .filter(term::Column::CourseId.eq(course_id))
            .order_by_asc(term::Column::Id)
            .all(self.conn)
            .await
    }

    pub async fn all_terms(&self) -> Result<Vec<term::Model>, DbErr> {
        term::Entity::find()
            .order_by_asc(term::Column::CourseId)
            .order_by_asc(term::Column::DayOfWeek)
            .order_by_asc(term::Column::StartsAt)
            .order_by_asc(term::Column::Id)
            .all(self.conn)
            .await
    }

    /// Lab terms of the course, ordered by day of week and then start time.
    pub async fn choosable_terms(&self, course_id: i32) -> Result<Vec<term::Model>, DbErr> {
        term::Entity::find()
            .filter(term::Column::CourseId.eq(course_id))
            .filter(term::Column::Kind.eq(TermKind::Lab.code()))
            .order_by_asc(term::Column::DayOfWeek)
            .order_by_asc(term::Column::StartsAt)
            .order_by_asc(term::Column::Id)
            .all(self.conn)
            .await
    }

    pub async fn choosable_term_ids(&self, course_id: i32) -> Result<Vec<i32>, DbErr> {
        term::Entity::find()
            .filter(term::Column::CourseId.eq(course_id))
            .filter(term::Column::Kind.eq(TermKind::Lab.code()))
            .select_only()
            .column(term::Column::Id)
            .into_tuple()
            .all(self.conn)
            .await
    }

    /// Distinct instructors teaching any term of the course.
    pub async fn course_instructors(&self, course_id: i32) -> Result<Vec<instructor::Model>, DbErr> {
        let term_ids: Vec<i32> = term::Entity::find()
            .filter(term::Column::CourseId.eq(course_id))
            .select_only()
            .column(term::Column::Id)
            .into_tuple()
            .all(self.conn)
            .await?;
        self.instructors_of_terms(term_ids).await
    }

    pub async fn term_instructors(&self, term_id: i32) -> Result<Vec<instructor::Model>, DbErr> {
        self.instructors_of_terms(vec![term_id]).await
    }

    async fn instructors_of_terms(&self, term_ids: Vec<i32>) -> Result<Vec<instructor::Model>, DbErr> {
        if term_ids.is_empty() {
            return Ok(Vec::new());
        }
        let instructor_ids: Vec<i32> = term_instructor::Entity::find()
            .filter(term_instructor::Column::TermId.is_in(term_ids))
            .select_only()
            .column(term_instructor::Column::InstructorId)
            .distinct()
            .into_tuple()
            .all(self.conn)
            .await?;
        if instructor_ids.is_empty() {
            return Ok(Vec::new());
        }
        instructor::Entity::find()
            .filter(instructor::Column::Id.is_in(instructor_ids))
            .order_by_asc(instructor::Column::Name)
            .all(self.conn)
            .await
    }

    /// Check a proposed allocation against the point budget of the course.
    ///
    /// Only lab terms count; entries for any other term are ignored.
    pub async fn validate_points(
        &self,
        course_id: i32,
        proposed: &HashMap<i32, i32>,
    ) -> Result<bool, DbErr> {
        let choosable = self.choosable_term_ids(course_id).await?;
        Ok(points::validate_points(&choosable, proposed))
    }

    /// Attach location, instructors and the unavailable flag to each term,
    /// preserving the input order.
    pub async fn term_details(
        &self,
        terms: Vec<term::Model>,
    ) -> Result<Vec<TermDetails>, DbErr> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        let term_ids: Vec<i32> = terms.iter().map(|t| t.id).collect();
        let location_ids: BTreeSet<i32> = terms.iter().map(|t| t.location_id).collect();

        let locations: HashMap<i32, location::Model> = location::Entity::find()
            .filter(location::Column::Id.is_in(location_ids))
            .all(self.conn)
            .await?
            .into_iter()
            .map(|l| (l.id, l))
            .collect();

        let links = term_instructor::Entity::find()
            .filter(term_instructor::Column::TermId.is_in(term_ids.clone()))
            .all(self.conn)
            .await?;
        let instructor_ids: BTreeSet<i32> = links.iter().map(|l| l.instructor_id).collect();
        let instructors: HashMap<i32, instructor::Model> = if instructor_ids.is_empty() {
            HashMap::new()
        } else {
            instructor::Entity::find()
                .filter(instructor::Column::Id.is_in(instructor_ids))
                .all(self.conn)
                .await?
                .into_iter()
                .map(|i| (i.id, i))
                .collect()
        };

        let unavailable: HashSet<i32> = unavailable_term::Entity::find()
            .filter(unavailable_term::Column::TermId.is_in(term_ids))
            .select_only()
            .column(unavailable_term::Column::TermId)
            .into_tuple::<i32>()
            .all(self.conn)
            .await?
            .into_iter()
            .collect();

        terms
            .into_iter()
            .map(|term| -> Result<TermDetails, DbErr> {
                let location = locations.get(&term.location_id).cloned().ok_or_else(|| {
                    DbErr::RecordNotFound(format!(
                        "Location {} of term {}",
                        term.location_id, term.id
                    ))
                })?;
                let mut term_instructors: Vec<instructor::Model> = links
                    .iter()
                    .filter(|l| l.term_id == term.id)
                    .filter_map(|l| instructors.get(&l.instructor_id).cloned())
                    .collect();
                term_instructors.sort_by(|a, b| a.name.cmp(&b.name));
                Ok(TermDetails {
                    unavailable: unavailable.contains(&term.id),
                    term,
                    location,
                    instructors: term_instructors,
                })
            })
            .collect()
    }

    /// Remove terms together with every row that references them.
    async fn delete_terms_cascade(&self, term_ids: Vec<i32>) -> Result<DeleteSummary, DbErr> {
        if term_ids.is_empty() {
            return Ok(DeleteSummary::default());
        }
        let selections = term_selection::Entity::delete_many()
            .filter(term_selection::Column::TermId.is_in(term_ids.clone()))
            .exec(self.conn)
            .await?;
        term_instructor::Entity::delete_many()
            .filter(term_instructor::Column::TermId.is_in(term_ids.clone()))
            .exec(self.conn)
            .await?;
        unavailable_term::Entity::delete_many()
            .filter(unavailable_term::Column::TermId.is_in(term_ids.clone()))
            .exec(self.conn)
            .await?;
        let terms = term::Entity::delete_many()
            .filter(term::Column::Id.is_in(term_ids))
            .exec(self.conn)
            .await?;

        Ok(DeleteSummary {
            terms_deleted: terms.rows_affected,
            selections_deleted: selections.rows_affected,
            enrollments_deleted: 0,
        })
    }
}

impl<'a, C: ConnectionTrait + TransactionTrait> CatalogService<'a, C> {
    /// Delete a course, its terms, their selections and the course's enrollments.
    pub async fn delete_course(&self, course_id: i32) -> Result<DeleteSummary, ServiceError> {
        let txn = self.conn.begin().await?;
        let catalog = CatalogService::new(&txn);
        let course = catalog.find_course(course_id).await?;

        let term_ids: Vec<i32> = catalog
            .course_terms(course_id)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();
        let mut summary = catalog.delete_terms_cascade(term_ids).await?;

        summary.enrollments_deleted = student_course::Entity::delete_many()
            .filter(student_course::Column::CourseId.eq(course_id))
            .exec(&txn)
            .await?
            .rows_affected;
        course::Entity::delete_by_id(course_id).exec(&txn).await?;

        txn.commit().await?;
        info!(
            course_id,
            name = %course.name,
            terms = summary.terms_deleted,
            selections = summary.selections_deleted,
            "Deleted course"
        );
        Ok(summary)
    }

    /// Delete one term and its selections. The course and its other terms stay.
    pub async fn delete_term(&self, term_id: i32) -> Result<DeleteSummary, ServiceError> {
        let txn = self.conn.begin().await?;
        let catalog = CatalogService::new(&txn);
        let term = catalog.find_term(term_id).await?;

        let summary = catalog.delete_terms_cascade(vec![term_id]).await?;

        txn.commit().await?;
        info!(
            term_id,
            course_id = term.course_id,
            selections = summary.selections_deleted,
            "Deleted term"
        );
        Ok(summary)
    }

    /// Load a schedule, reusing existing records by natural key.
    ///
    /// Runs in one transaction: either the whole schedule lands or nothing does.
    pub async fn import(&self, courses: &[ImportCourse]) -> Result<ImportSummary, ServiceError> {
        let txn = self.conn.begin().await?;
        let catalog = CatalogService::new(&txn);
        let mut summary = ImportSummary::default();

        for entry in courses {
            let (course, created) = catalog.get_or_create_course(&entry.name).await?;
            if created {
                summary.courses_created += 1;
            } else {
                summary.courses_reused += 1;
            }

            for t in &entry.terms {
                let (location, created) = catalog
                    .get_or_create_location(&t.location_name, t.location_capacity)
                    .await?;
                if created {
                    summary.locations_created += 1;
                }

                let new = NewTerm {
                    course_id: course.id,
                    kind: t.kind,
                    day: t.day,
                    starts_at: t.starts_at,
                    ends_at: t.ends_at,
                    location_id: location.id,
                };
                let (term, created) = catalog.get_or_create_term(&new).await?;
                if created {
                    summary.terms_created += 1;
                } else {
                    summary.terms_reused += 1;
                }

                for i in &t.instructors {
                    let (instructor, created) =
                        catalog.get_or_create_instructor(&i.name, &i.email).await?;
                    if created {
                        summary.instructors_created += 1;
                    }
                    if catalog.assign_instructor(term.id, instructor.id).await? {
                        summary.instructor_links_created += 1;
                    }
                }
            }
        }

        txn.commit().await?;
        info!(
            courses_created = summary.courses_created,
            terms_created = summary.terms_created,
            terms_reused = summary.terms_reused,
            "Imported schedule"
        );
        Ok(summary)
    }
}

/// Run an `ON CONFLICT DO NOTHING` insert. Returns false when the row already existed.
///
/// A skipped insert leaves an enclosing transaction usable, unlike a caught
/// unique violation on PostgreSQL.
async fn insert_if_absent<A, C>(insert: Insert<A>, conn: &C) -> Result<bool, DbErr>
where
    A: ActiveModelTrait,
    C: ConnectionTrait,
{
    match insert.exec_without_returning(conn).await {
        Ok(rows) => Ok(rows > 0),
        Err(DbErr::RecordNotInserted) => Ok(false),
        Err(e) => Err(e),
    }
}

fn vanished(entity: &str, name: &str) -> DbErr {
    DbErr::RecordNotFound(format!("{entity} '{name}' missing after insert"))
}
