use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Seats assumed for a room when the import does not say otherwise.
pub const DEFAULT_CAPACITY: i32 = 15;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "location")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,

    #[sea_orm(default_value = 15)]
    pub capacity: i32,

    #[sea_orm(has_many)]
    pub terms: HasMany<super::term::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
