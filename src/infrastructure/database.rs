use crate::entities::guest_recipes;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Schema,
};
use std::time::Duration;
use tracing::info;
use url::Url;

pub async fn setup_database(db_url: &str) -> anyhow::Result<DatabaseConnection> {
    info!("📂 Database: {}", redact(db_url));

    // One record at a time; a couple of connections is plenty
    let mut opt = ConnectOptions::new(db_url);
    opt.max_connections(4)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;

    info!("✅ Database connected successfully");

    run_migrations(&db).await?;

    Ok(db)
}

/// Create the recipe table for local SQLite databases.
///
/// The Postgres schema belongs to the web application and is left untouched.
pub async fn run_migrations(db: &DatabaseConnection) -> anyhow::Result<()> {
    let builder = db.get_database_backend();
    if builder == DatabaseBackend::Postgres {
        return Ok(());
    }

    info!("🔄 Running SeaORM auto-migrations for SQLite/Other...");
    let schema = Schema::new(builder);
    let stmt = schema
        .create_table_from_entity(guest_recipes::Entity)
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&stmt)).await?;

    Ok(())
}

/// Hide the password of a connection string before logging it
fn redact(db_url: &str) -> String {
    let Ok(mut url) = Url::parse(db_url) else {
        return "<unparseable database url>".to_string();
    };
    if url.password().is_some() && url.set_password(Some("****")).is_err() {
        return "<unparseable database url>".to_string();
    }
    url.to_string()
}
