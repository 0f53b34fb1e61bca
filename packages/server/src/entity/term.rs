use enrollment_common::{DayOfWeek, LookupError, TermKind};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "term")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// `TermKind` code. Kept as a raw integer so bad rows surface as lookup errors.
    pub kind: i32,
    /// `DayOfWeek` code, 1 (Monday) to 5 (Friday).
    pub day_of_week: i32,
    pub starts_at: chrono::NaiveTime,
    pub ends_at: chrono::NaiveTime,

    pub course_id: i32,
    #[sea_orm(belongs_to, from = "course_id", to = "id")]
    pub course: HasOne<super::course::Entity>,

    pub location_id: i32,
    #[sea_orm(belongs_to, from = "location_id", to = "id")]
    pub location: HasOne<super::location::Entity>,

    #[sea_orm(has_many, via = "term_instructor")]
    pub instructors: HasMany<super::instructor::Entity>,

    #[sea_orm(has_many)]
    pub selections: HasMany<super::term_selection::Entity>,

    #[sea_orm(has_many, via = "unavailable_term")]
    pub unavailable_in: HasMany<super::unavailable_selection::Entity>,
}

impl Model {
    pub fn term_kind(&self) -> Result<TermKind, LookupError> {
        TermKind::from_code(self.kind)
    }

    pub fn day(&self) -> Result<DayOfWeek, LookupError> {
        DayOfWeek::from_code(self.day_of_week)
    }

    pub fn type_name(&self) -> Result<&'static str, LookupError> {
        self.term_kind().map(|kind| kind.display_name())
    }

    pub fn day_of_week_name(&self) -> Result<&'static str, LookupError> {
        self.day().map(|day| day.display_name())
    }
}

impl ActiveModelBehavior for ActiveModel {}
