use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "unavailable_term")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub selection_id: i32,
    #[sea_orm(primary_key)]
    pub term_id: i32,
    #[sea_orm(belongs_to, from = "selection_id", to = "id")]
    pub selection: HasOne<super::unavailable_selection::Entity>,
    #[sea_orm(belongs_to, from = "term_id", to = "id")]
    pub term: HasOne<super::term::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
