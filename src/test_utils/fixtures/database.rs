//! Database fixture for tests.
//!
//! Every test gets its own in-memory SQLite database with migrations
//! applied.

use rstest::*;
use sqlx::SqlitePool;

use crate::db;

/// Fresh migrated in-memory database
///
/// # Example
///
/// ```rust,ignore
/// #[rstest]
/// #[tokio::test]
/// async fn my_test(#[future] test_database: SqlitePool) {
///     let db = test_database.await;
/// }
/// ```
#[fixture]
pub async fn test_database() -> SqlitePool {
	let pool = db::connect("sqlite::memory:")
		.await
		.expect("Failed to open in-memory database");
	db::migrate(&pool).await.expect("Failed to apply migrations");
	pool
}
