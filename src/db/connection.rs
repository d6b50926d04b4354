use crate::config::Config;
use crate::db::schema;
use anyhow::{Context, Result};
use log::info;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::PathBuf;

pub type SqlitePool = Pool<SqliteConnectionManager>;

/// Establishes a connection pool for the database file at `path`.
///
/// Every connection handed out by the pool has foreign key enforcement enabled
/// and the name collation registered.
pub fn establish_pool_with_path(path: PathBuf, max_size: u32) -> Result<SqlitePool> {
	info!("SQLite database will be located at: {:?}", path);

	if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
		std::fs::create_dir_all(parent).context("Failed to create database directory")?;
	}

	let manager = SqliteConnectionManager::file(path)
		.with_init(|conn| {
			conn.execute_batch("PRAGMA foreign_keys = ON;")?;
			schema::register_collations(conn)
		});

	let pool = Pool::builder()
		.max_size(max_size)
		.build(manager)
		.context("Failed to create SQLite connection pool")?;

	info!("SQLite connection pool established with {} connections", max_size);
	Ok(pool)
}

/// Establishes a connection pool from the loaded configuration
pub fn establish_pool(config: &Config) -> Result<SqlitePool> {
	establish_pool_with_path(config.database_path.clone(), config.pool_size)
}
