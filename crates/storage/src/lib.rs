//! Storage layer for the leettrack backend.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod task_repository;
pub mod user_repository;

pub use error::StorageError;
pub use task_repository::{BatchInsertOutcome, PgTaskRepository, TaskRepository};
pub use user_repository::{PgUserRepository, UserRecord, UserRepository};

/// Creates a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool, StorageError> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(StorageError::Connection)
}

/// Runs all SQL migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), StorageError> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(StorageError::Migration)
}

/// Checks DB connectivity with a minimal query.
pub async fn check_connection(pool: &PgPool) -> Result<(), StorageError> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .map_err(StorageError::Query)?;
    Ok(())
}
