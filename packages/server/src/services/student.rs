use std::collections::HashSet;

use chrono::Utc;
use enrollment_common::{ActivationState, Transition};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, ExprTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionSession,
    TransactionTrait,
};
use tracing::info;

use crate::entity::{student, student_course, term, term_selection};
use crate::models::shared::escape_like;
use crate::services::catalog::CatalogService;
use crate::services::error::ServiceError;
use crate::utils::hash;

/// Registration data. The password is hashed before anything is built from it.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub index: i32,
    pub name: String,
    pub surname: String,
    pub group_id: i32,
    pub password: String,
}

/// Filters for the administrative student list.
#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    /// Case-insensitive substring of name or surname, or an exact index.
    pub search: Option<String>,
    pub activation: Option<ActivationState>,
}

pub struct StudentService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> StudentService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Build an unsaved, pending student with a hashed password.
    pub fn new_student(new: &NewStudent) -> Result<student::ActiveModel, ServiceError> {
        let password = hash::hash_password(&new.password)
            .map_err(|e| ServiceError::PasswordHash(e.to_string()))?;
        Ok(student::ActiveModel {
            index: Set(new.index),
            name: Set(new.name.clone()),
            surname: Set(new.surname.clone()),
            group_id: Set(new.group_id),
            is_activated: Set(ActivationState::Pending.code()),
            password: Set(password),
            created_at: Set(Utc::now()),
            ..Default::default()
        })
    }

    /// Insert a new pending student. A taken index surfaces as a unique-constraint `DbErr`.
    pub async fn register(&self, new: &NewStudent) -> Result<student::Model, ServiceError> {
        let model = Self::new_student(new)?.insert(self.conn).await?;
        info!(student_id = model.id, index = model.index, "Registered student");
        Ok(model)
    }

    pub async fn find(&self, id: i32) -> Result<student::Model, ServiceError> {
        student::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Student", id))
    }

    pub async fn find_by_index(&self, index: i32) -> Result<Option<student::Model>, DbErr> {
        student::Entity::find()
            .filter(student::Column::Index.eq(index))
            .one(self.conn)
            .await
    }

    /// Apply an admin transition to `is_activated`. Nothing else on the row changes.
    pub async fn transition(
        &self,
        id: i32,
        transition: Transition,
    ) -> Result<student::Model, ServiceError> {
        let existing = self.find(id).await?;
        let from = existing.activation();
        let to = from.apply(transition);

        let mut active: student::ActiveModel = existing.into();
        active.is_activated = Set(to.code());
        let model = active.update(self.conn).await?;

        info!(student_id = id, %transition, %from, %to, "Changed student activation");
        Ok(model)
    }

    /// True iff the student is enrolled in the course. Unknown ids are simply false.
    pub async fn has_joined_course(&self, student_id: i32, course_id: i32) -> Result<bool, DbErr> {
        Ok(student_course::Entity::find_by_id((student_id, course_id))
            .one(self.conn)
            .await?
            .is_some())
    }

    pub async fn joined_course_ids(&self, student_id: i32) -> Result<HashSet<i32>, DbErr> {
        let ids: Vec<i32> = student_course::Entity::find()
            .filter(student_course::Column::StudentId.eq(student_id))
            .select_only()
            .column(student_course::Column::CourseId)
            .into_tuple()
            .all(self.conn)
            .await?;
        Ok(ids.into_iter().collect())
    }

    /// Enroll the student. Returns false if they were already enrolled.
    pub async fn join_course(&self, student_id: i32, course_id: i32) -> Result<bool, ServiceError> {
        self.find(student_id).await?;
        CatalogService::new(self.conn).find_course(course_id).await?;

        if self.has_joined_course(student_id, course_id).await? {
            return Ok(false);
        }
        student_course::ActiveModel {
            student_id: Set(student_id),
            course_id: Set(course_id),
            joined_at: Set(Utc::now()),
        }
        .insert(self.conn)
        .await?;

        info!(student_id, course_id, "Student joined course");
        Ok(true)
    }

    /// One page of students matching `filter`, plus the total match count.
    pub async fn list(
        &self,
        filter: &StudentFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<student::Model>, u64), DbErr> {
        let mut select = student::Entity::find();

        if let Some(state) = filter.activation {
            select = select.filter(match state {
                ActivationState::Promoted => {
                    student::Column::IsActivated.gte(ActivationState::Promoted.code())
                }
                other => student::Column::IsActivated.eq(other.code()),
            });
        }

        if let Some(ref search) = filter.search {
            let trimmed = search.trim();
            if !trimmed.is_empty() {
                let pattern = format!("%{}%", escape_like(trimmed).to_lowercase());
                let mut any = Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(student::Column::Name)))
                            .like(LikeExpr::new(pattern.clone()).escape('\\')),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(student::Column::Surname)))
                            .like(LikeExpr::new(pattern).escape('\\')),
                    );
                if let Ok(index) = trimmed.parse::<i32>() {
                    any = any.add(student::Column::Index.eq(index));
                }
                select = select.filter(any);
            }
        }

        let total = select.clone().paginate(self.conn, per_page).num_items().await?;

        let data = select
            .order_by_asc(student::Column::Surname)
            .order_by_asc(student::Column::Name)
            .order_by_asc(student::Column::Id)
            .offset(Some(page.saturating_sub(1).saturating_mul(per_page)))
            .limit(Some(per_page))
            .all(self.conn)
            .await?;

        Ok((data, total))
    }
}

impl<'a, C: ConnectionTrait + TransactionTrait> StudentService<'a, C> {
    /// Remove the enrollment and the student's selections for the course's terms.
    /// Returns false if the student was not enrolled.
    pub async fn leave_course(&self, student_id: i32, course_id: i32) -> Result<bool, ServiceError> {
        let txn = self.conn.begin().await?;
        let students = StudentService::new(&txn);
        students.find(student_id).await?;
        CatalogService::new(&txn).find_course(course_id).await?;

        let removed = student_course::Entity::delete_by_id((student_id, course_id))
            .exec(&txn)
            .await?
            .rows_affected;
        if removed == 0 {
            return Ok(false);
        }

        let term_ids: Vec<i32> = term::Entity::find()
            .filter(term::Column::CourseId.eq(course_id))
            .select_only()
            .column(term::Column::Id)
            .into_tuple()
            .all(&txn)
            .await?;
        if !term_ids.is_empty() {
            term_selection::Entity::delete_many()
                .filter(term_selection::Column::StudentId.eq(student_id))
                .filter(term_selection::Column::TermId.is_in(term_ids))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        info!(student_id, course_id, "Student left course");
        Ok(true)
    }
}
