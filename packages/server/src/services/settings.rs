use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, Set};

use crate::entity::settings::{self, SETTINGS_ID};

/// Fields to change; `None` leaves a field as it is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub registration_open: Option<bool>,
    pub selections_open: Option<bool>,
}

pub struct SettingsService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> SettingsService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Current settings, creating the default row if startup seeding has not run.
    pub async fn get(&self) -> Result<settings::Model, DbErr> {
        if let Some(existing) = settings::Entity::find_by_id(SETTINGS_ID)
            .one(self.conn)
            .await?
        {
            return Ok(existing);
        }
        Self::default_row().insert(self.conn).await
    }

    pub async fn update(&self, update: SettingsUpdate) -> Result<settings::Model, DbErr> {
        let current = self.get().await?;
        if update == SettingsUpdate::default() {
            return Ok(current);
        }

        let mut active: settings::ActiveModel = current.into();
        if let Some(open) = update.registration_open {
            active.registration_open = Set(open);
        }
        if let Some(open) = update.selections_open {
            active.selections_open = Set(open);
        }
        active.updated_at = Set(Utc::now());
        active.update(self.conn).await
    }

    pub fn default_row() -> settings::ActiveModel {
        settings::ActiveModel {
            id: Set(SETTINGS_ID),
            registration_open: Set(true),
            selections_open: Set(true),
            updated_at: Set(Utc::now()),
        }
    }
}
