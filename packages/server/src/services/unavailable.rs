use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionSession, TransactionTrait,
};
use tracing::info;

use crate::entity::{term, unavailable_selection, unavailable_term};
use crate::services::error::ServiceError;

/// A selection together with the ids of the terms it marks unavailable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnavailableSelection {
    pub selection: unavailable_selection::Model,
    pub term_ids: Vec<i32>,
}

pub struct UnavailableTermsService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> UnavailableTermsService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<UnavailableSelection>, DbErr> {
        let selections = unavailable_selection::Entity::find()
            .order_by_asc(unavailable_selection::Column::Id)
            .all(self.conn)
            .await?;

        let mut links: HashMap<i32, Vec<i32>> = HashMap::new();
        for link in unavailable_term::Entity::find()
            .order_by_asc(unavailable_term::Column::TermId)
            .all(self.conn)
            .await?
        {
            links.entry(link.selection_id).or_default().push(link.term_id);
        }

        Ok(selections
            .into_iter()
            .map(|selection| UnavailableSelection {
                term_ids: links.remove(&selection.id).unwrap_or_default(),
                selection,
            })
            .collect())
    }

    pub async fn get(&self, id: i32) -> Result<UnavailableSelection, ServiceError> {
        let selection = unavailable_selection::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Unavailable term selection", id))?;
        let term_ids = self.term_ids(id).await?;
        Ok(UnavailableSelection {
            selection,
            term_ids,
        })
    }

    async fn term_ids(&self, selection_id: i32) -> Result<Vec<i32>, DbErr> {
        unavailable_term::Entity::find()
            .filter(unavailable_term::Column::SelectionId.eq(selection_id))
            .select_only()
            .column(unavailable_term::Column::TermId)
            .order_by_asc(unavailable_term::Column::TermId)
            .into_tuple()
            .all(self.conn)
            .await
    }
}

impl<'a, C: ConnectionTrait + TransactionTrait> UnavailableTermsService<'a, C> {
    /// Create a new selection when `selection_id` is `None`, otherwise replace
    /// the name and term set of the existing one.
    pub async fn save(
        &self,
        selection_id: Option<i32>,
        name: &str,
        term_ids: &[i32],
    ) -> Result<UnavailableSelection, ServiceError> {
        let wanted: BTreeSet<i32> = term_ids.iter().copied().collect();

        let txn = self.conn.begin().await?;

        if !wanted.is_empty() {
            let found: BTreeSet<i32> = term::Entity::find()
                .filter(term::Column::Id.is_in(wanted.iter().copied()))
                .select_only()
                .column(term::Column::Id)
                .into_tuple::<i32>()
                .all(&txn)
                .await?
                .into_iter()
                .collect();
            if let Some(missing) = wanted.difference(&found).next() {
                return Err(ServiceError::not_found("Term", *missing));
            }
        }

        let now = Utc::now();
        let selection = match selection_id {
            None => {
                unavailable_selection::ActiveModel {
                    name: Set(name.to_string()),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await?
            }
            Some(id) => {
                let existing = unavailable_selection::Entity::find_by_id(id)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Unavailable term selection", id))?;
                unavailable_term::Entity::delete_many()
                    .filter(unavailable_term::Column::SelectionId.eq(id))
                    .exec(&txn)
                    .await?;

                let mut active: unavailable_selection::ActiveModel = existing.into();
                active.name = Set(name.to_string());
                active.updated_at = Set(now);
                active.update(&txn).await?
            }
        };

        for term_id in &wanted {
            unavailable_term::ActiveModel {
                selection_id: Set(selection.id),
                term_id: Set(*term_id),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        info!(
            selection_id = selection.id,
            created = selection_id.is_none(),
            terms = wanted.len(),
            "Saved unavailable terms"
        );
        Ok(UnavailableSelection {
            selection,
            term_ids: wanted.into_iter().collect(),
        })
    }
}
