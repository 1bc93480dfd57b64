//! SQLite connection pool and embedded migrations

use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use crate::exception::{Error, Result};

/// Migrations under `./migrations`, compiled into the binary
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Open a pool for `url`
///
/// Foreign keys are switched on for every connection so deletes cascade.
/// In-memory databases are private to one connection, so their pool is
/// pinned to a single connection that never expires.
pub async fn connect(url: &str) -> Result<SqlitePool> {
	let options = SqliteConnectOptions::from_str(url)
		.map_err(|e| Error::Configuration(format!("Invalid database URL '{}': {}", url, e)))?
		.create_if_missing(true)
		.foreign_keys(true);

	let pool = if is_memory(url) {
		SqlitePoolOptions::new()
			.max_connections(1)
			.min_connections(1)
			.idle_timeout(None)
			.max_lifetime(None)
			.connect_with(options)
			.await?
	} else {
		SqlitePoolOptions::new()
			.max_connections(10)
			.connect_with(options)
			.await?
	};

	tracing::debug!(url, "Connected to database");
	Ok(pool)
}

/// Apply pending migrations
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
	MIGRATOR.run(pool).await?;
	tracing::info!("Database migrations applied");
	Ok(())
}

fn is_memory(url: &str) -> bool {
	url.contains(":memory:") || url.contains("mode=memory")
}
