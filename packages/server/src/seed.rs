use enrollment_common::ActivationState;
use sea_orm::sea_query::{
    Index, IndexCreateStatement, MysqlQueryBuilder, OnConflict, PostgresQueryBuilder,
    SqliteQueryBuilder,
};
use sea_orm::*;
use tracing::info;

use crate::config::AuthConfig;
use crate::entity::{settings, term, term_selection, unavailable_term};
use crate::services::error::ServiceError;
use crate::services::student::NewStudent;
use crate::services::{SettingsService, StudentService};

/// Run every startup seed step.
pub async fn seed(db: &DatabaseConnection, auth: &AuthConfig) -> Result<(), ServiceError> {
    ensure_settings(db).await?;
    ensure_indexes(db).await?;
    ensure_bootstrap_admin(db, auth).await?;
    Ok(())
}

/// Insert the singleton settings row unless it already exists.
pub async fn ensure_settings(db: &DatabaseConnection) -> Result<(), DbErr> {
    let result = settings::Entity::insert(SettingsService::<DatabaseConnection>::default_row())
        .on_conflict(
            OnConflict::column(settings::Column::Id)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(0) | Err(DbErr::RecordNotInserted) => Ok(()),
        Ok(_) => {
            info!("Seeded default settings");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Ensure secondary indexes exist.
///
/// Schema-sync only creates primary keys and unique constraints, so the
/// lookup indexes for the hot queries are created here.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Choosable terms: WHERE course_id = ? AND kind = 3
    create_index(
        db,
        Index::create()
            .if_not_exists()
            .name("idx_term_course_kind")
            .table(term::Entity)
            .col(term::Column::CourseId)
            .col(term::Column::Kind)
            .to_owned(),
    )
    .await;

    // Cascading term deletes: WHERE term_id IN (...)
    create_index(
        db,
        Index::create()
            .if_not_exists()
            .name("idx_term_selection_term")
            .table(term_selection::Entity)
            .col(term_selection::Column::TermId)
            .to_owned(),
    )
    .await;

    // Unavailable flag lookup: WHERE term_id IN (...)
    create_index(
        db,
        Index::create()
            .if_not_exists()
            .name("idx_unavailable_term_term")
            .table(unavailable_term::Entity)
            .col(unavailable_term::Column::TermId)
            .to_owned(),
    )
    .await;

    Ok(())
}

async fn create_index(db: &DatabaseConnection, stmt: IndexCreateStatement) {
    let backend = db.get_database_backend();
    let sql = if backend == DbBackend::Sqlite {
        stmt.to_string(SqliteQueryBuilder)
    } else if backend == DbBackend::MySql {
        stmt.to_string(MysqlQueryBuilder)
    } else {
        stmt.to_string(PostgresQueryBuilder)
    };

    match db.execute_unprepared(&sql).await {
        Ok(_) => tracing::debug!("Ensured index: {}", sql),
        Err(e) => tracing::warn!("Failed to create index ({}): {}", sql, e),
    }
}

/// Create the configured administrator as a promoted student if its index is free.
pub async fn ensure_bootstrap_admin(
    db: &DatabaseConnection,
    auth: &AuthConfig,
) -> Result<(), ServiceError> {
    let Some(admin) = &auth.bootstrap_admin else {
        return Ok(());
    };

    let students = StudentService::new(db);
    if students.find_by_index(admin.index).await?.is_some() {
        return Ok(());
    }

    let mut model = StudentService::<DatabaseConnection>::new_student(&NewStudent {
        index: admin.index,
        name: admin.name.clone(),
        surname: admin.surname.clone(),
        group_id: 0,
        password: admin.password.clone(),
    })?;
    model.is_activated = Set(ActivationState::Promoted.code());
    let created = model.insert(db).await?;

    info!(student_id = created.id, index = created.index, "Created bootstrap administrator");
    Ok(())
}
