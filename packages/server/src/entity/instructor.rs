use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "instructor")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Natural key used by schedule imports.
    #[sea_orm(unique)]
    pub name: String,
    pub email: String,

    #[sea_orm(has_many, via = "term_instructor")]
    pub terms: HasMany<super::term::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
