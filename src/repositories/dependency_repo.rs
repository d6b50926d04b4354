// src/repositories/dependency_repo.rs

use super::rows::{
	application_version_from_row, dependency_from_row, version_from_row,
	APPLICATION_VERSION_COLUMNS, DEPENDENCY_COLUMNS,
};
use super::upsert;
use crate::db::connection::SqlitePool;
use crate::db::transaction::{with_connection, with_transaction};
use crate::error::{require_name, InventoryError, Result};
use crate::models::library::{ApplicationDependency, ApplicationVersion, LibraryVersion};
use log::info;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Arc;

fn row_exists(conn: &Connection, table: &str, id: i64) -> Result<bool> {
	let found = conn
		.query_row(&format!("SELECT 1 FROM {} WHERE id = ?1", table), params![id], |_| Ok(()))
		.optional()?;
	Ok(found.is_some())
}

pub struct DependencyRepository {
	pool: Arc<SqlitePool>,
}

impl DependencyRepository {
	pub fn new(pool: Arc<SqlitePool>) -> Self {
		Self { pool }
	}

	/// Finds or creates the application version a dependency starts from.
	pub async fn add_application_version(&self, application_name: &str, version: &str) -> Result<ApplicationVersion> {
		require_name("application name", application_name)?;
		require_name("application version", version)?;

		let application_name = application_name.to_string();
		let version = version.to_string();

		with_transaction(&self.pool, move |tx| {
			upsert::find_or_create_application_version(tx, &application_name, &version)
		})
			.await
	}

	pub async fn get_application_version(&self, id: i64) -> Result<ApplicationVersion> {
		with_connection(&self.pool, move |conn| {
			conn.query_row(
				&format!("SELECT {} FROM application_versions WHERE id = ?1", APPLICATION_VERSION_COLUMNS),
				params![id],
				application_version_from_row,
			)
				.optional()?
				.ok_or_else(|| InventoryError::not_found("application version", id))
		})
			.await
	}

	/// Returns the library versions an application version depends on
	pub async fn get_dependencies(&self, application_version_id: i64) -> Result<Vec<LibraryVersion>> {
		with_connection(&self.pool, move |conn| {
			let mut stmt = conn.prepare(
				"SELECT lv.id, lv.library_id, lv.library_version, lv.secunia
				 FROM application_dependencies ad
				 JOIN library_versions lv ON ad.library_version_id = lv.id
				 WHERE ad.application_version_id = ?1
				 ORDER BY ad.id"
			)?;

			let versions = stmt
				.query_map(params![application_version_id], version_from_row)?
				.collect::<rusqlite::Result<Vec<_>>>()?;
			Ok(versions)
		})
			.await
	}

	/// Records that an application version depends on a library version.
	///
	/// Both rows must already exist. Adding the same link twice is a conflict.
	pub async fn add_dependency(
		&self,
		application_version_id: i64,
		library_version_id: i64,
	) -> Result<ApplicationDependency> {
		with_transaction(&self.pool, move |tx| {
			if !row_exists(tx, "application_versions", application_version_id)? {
				return Err(InventoryError::not_found("application version", application_version_id));
			}
			if !row_exists(tx, "library_versions", library_version_id)? {
				return Err(InventoryError::not_found("library version", library_version_id));
			}

			tx.execute(
				"INSERT INTO application_dependencies (application_version_id, library_version_id)
				 VALUES (?1, ?2)",
				params![application_version_id, library_version_id],
			)?;

			let dependency = tx.query_row(
				&format!("SELECT {} FROM application_dependencies WHERE id = ?1", DEPENDENCY_COLUMNS),
				params![tx.last_insert_rowid()],
				dependency_from_row,
			)?;

			info!(
				"Added dependency {} from application version {} to library version {}",
				dependency.id, application_version_id, library_version_id
			);
			Ok(dependency)
		})
			.await
	}

	/// Deletes the link between an application version and a library version.
	pub async fn delete_dependency(&self, application_version_id: i64, library_version_id: i64) -> Result<()> {
		with_transaction(&self.pool, move |tx| {
			let deleted = tx.execute(
				"DELETE FROM application_dependencies
				 WHERE application_version_id = ?1 AND library_version_id = ?2",
				params![application_version_id, library_version_id],
			)?;

			if deleted == 0 {
				return Err(InventoryError::not_found(
					"application dependency",
					format!("{}/{}", application_version_id, library_version_id),
				));
			}

			info!(
				"Deleted dependency from application version {} to library version {}",
				application_version_id, library_version_id
			);
			Ok(())
		})
			.await
	}
}
