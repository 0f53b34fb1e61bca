use enrollment_common::ActivationState;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Student number printed on the student card.
    #[sea_orm(unique)]
    pub index: i32,
    pub name: String,
    pub surname: String,
    pub group_id: i32,
    /// `ActivationState` code.
    pub is_activated: i32,
    /// Argon2 PHC string, never the plaintext password.
    #[serde(skip_serializing)]
    pub password: String,

    #[sea_orm(has_many, via = "student_course")]
    pub courses: HasMany<super::course::Entity>,

    #[sea_orm(has_many)]
    pub selections: HasMany<super::term_selection::Entity>,

    pub created_at: DateTimeUtc,
}

impl Model {
    /// Activation state; codes below zero are treated as pending.
    pub fn activation(&self) -> ActivationState {
        ActivationState::from_code(self.is_activated).unwrap_or_default()
    }
}

impl ActiveModelBehavior for ActiveModel {}
