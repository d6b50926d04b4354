// src/test_support.rs

use crate::db::connection::{self, SqlitePool};
use anyhow::Result;
use std::sync::Arc;
use tempfile::TempDir;

/// A schema-initialized database living in a temporary directory.
///
/// The directory is removed when this value is dropped, so keep it alive for
/// as long as the pool is used.
pub struct TestDb {
	pub pool: Arc<SqlitePool>,
	_dir: TempDir,
}

pub fn setup_test_db() -> Result<TestDb> {
	let dir = tempfile::tempdir()?;
	let db_path = dir.path().join("test.db");
	let pool = Arc::new(connection::establish_pool_with_path(db_path, 4)?);

	let conn = pool.get()?;
	crate::db::schema::create_tables(&conn)?;

	Ok(TestDb { pool, _dir: dir })
}
