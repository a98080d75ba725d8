pub mod models;
pub mod schema;

use diesel::{Connection, PgConnection};
use diesel_async::{
    pooled_connection::{deadpool::Pool, AsyncDieselConnectionManager},
    AsyncPgConnection,
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use thiserror::Error;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/migrations");

pub type DbPool = Pool<AsyncPgConnection>;

#[derive(Error, Debug)]
pub enum DBError {
    #[error("failed to connect to database: {0}")]
    ConnectionError(#[from] diesel::ConnectionError),
    #[error("failed to run migrations: {0}")]
    MigrationError(#[from] Box<dyn std::error::Error + Send + Sync>),
    #[error("failed to create database connection pool: {0}")]
    PoolCreationError(#[from] diesel_async::pooled_connection::deadpool::BuildError),
    #[error("failed to execute query: {0}")]
    DieselError(#[from] diesel::result::Error),
}

/// Applies every embedded migration that has not been applied yet.
/// Runs on a blocking connection since the harness is synchronous.
pub fn run_migrations(database_url_base: &str, database_name: &str) -> Result<(), DBError> {
    let url = make_database_url(database_url_base, database_name);
    let mut connection = PgConnection::establish(&url)?;
    let applied = connection.run_pending_migrations(MIGRATIONS)?;

    for version in applied {
        log::info!(target: "db", version:%; "Migration applied.");
    }

    Ok(())
}

pub fn create_database_connection_pool(
    database_url_base: &str,
    database_name: &str,
    max_connections: Option<usize>,
) -> Result<DbPool, DBError> {
    let url = make_database_url(database_url_base, database_name);
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(url);
    let builder = Pool::builder(manager);
    let builder = match max_connections {
        Some(max_connections) => builder.max_size(max_connections),
        None => builder,
    };
    let pool = builder.build()?;
    Ok(pool)
}

fn make_database_url(database_url_base: &str, database_name: &str) -> String {
    if database_url_base.ends_with('/') {
        format!("{}{}", database_url_base, database_name)
    } else {
        format!("{}/{}", database_url_base, database_name)
    }
}
