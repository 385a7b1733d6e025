use crate::error::DbError;
use dotenvy::dotenv;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::env;
use std::time::Duration;

/// Establishes a connection pool to the PostgreSQL catalog database.
///
/// Reads `DATABASE_URL` from the environment (loading `.env` first if one
/// is present) and returns a pool that the whole application shares.
pub async fn connect() -> Result<PgPool, DbError> {
    // A missing .env file is fine in deployments that set the variable directly.
    dotenv().ok();

    let database_url = env::var("DATABASE_URL")
        .map_err(|_e| DbError::ConnectionConfigError("DATABASE_URL must be set.".to_string()))?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&database_url)
        .await?;

    Ok(pool)
}

/// A utility function to run database migrations automatically.
///
/// The catalog schema (users, lists, titles, editions, authors, publishers,
/// categories and their association tables) is applied on startup so a fresh
/// database is immediately usable.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
