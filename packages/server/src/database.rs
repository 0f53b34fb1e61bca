use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use crate::entity::*;

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    // Set connection pool options
    opt.max_connections(20)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;
    sync_schema(&db).await?;

    Ok(db)
}

/// Create or migrate every table from the entity definitions.
///
/// Parents are registered before the tables that reference them.
pub async fn sync_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.get_schema_builder()
        .register(course::Entity)
        .register(instructor::Entity)
        .register(location::Entity)
        .register(term::Entity)
        .register(term_instructor::Entity)
        .register(student::Entity)
        .register(student_course::Entity)
        .register(term_selection::Entity)
        .register(unavailable_selection::Entity)
        .register(unavailable_term::Entity)
        .register(settings::Entity)
        .sync(db)
        .await
}
