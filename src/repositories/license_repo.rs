// src/repositories/license_repo.rs

use super::rows::{license_from_row, LICENSE_COLUMNS};
use crate::db::connection::SqlitePool;
use crate::db::transaction::with_connection;
use crate::error::{InventoryError, Result};
use crate::models::library::License;
use log::debug;
use rusqlite::{params, OptionalExtension};
use std::sync::Arc;

pub struct LicenseRepository {
	pool: Arc<SqlitePool>,
}

impl LicenseRepository {
	pub fn new(pool: Arc<SqlitePool>) -> Self {
		Self { pool }
	}

	/// Loads a license including its attached document
	pub async fn get_license(&self, id: i64) -> Result<License> {
		with_connection(&self.pool, move |conn| {
			let license = conn
				.query_row(
					&format!("SELECT {} FROM licenses WHERE id = ?1", LICENSE_COLUMNS),
					params![id],
					license_from_row,
				)
				.optional()?
				.ok_or_else(|| InventoryError::not_found("license", id))?;

			debug!("Loaded license {} ({:?})", license.license_name, license.filename);
			Ok(license)
		})
			.await
	}

	/// Lists every license ordered by name. Attached documents are not loaded.
	pub async fn unique_licenses(&self) -> Result<Vec<License>> {
		with_connection(&self.pool, |conn| {
			let mut stmt = conn.prepare(
				"SELECT DISTINCT id, license_name, NULL, filename, content_type
				 FROM licenses
				 ORDER BY license_name"
			)?;

			let licenses = stmt
				.query_map([], license_from_row)?
				.collect::<rusqlite::Result<Vec<_>>>()?;
			Ok(licenses)
		})
			.await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::upload::{NewLibrary, UploadedFile};
	use crate::repositories::library_repo::LibraryRepository;
	use crate::test_support::setup_test_db;

	#[tokio::test]
	async fn test_get_license_round_trips_document() -> anyhow::Result<()> {
		let db = setup_test_db()?;
		let libraries = LibraryRepository::new(db.pool.clone());
		let repo = LicenseRepository::new(db.pool.clone());

		let document: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
		libraries
			.add_libraries(
				NewLibrary::new("Acme", "Proprietary", "widgets", "1.0"),
				Some(UploadedFile::new("EULA.pdf", "application/pdf", document.clone())),
			)
			.await?;

		let listed = repo.unique_licenses().await?;
		assert_eq!(listed.len(), 1);
		assert!(listed[0].text.is_none());
		assert_eq!(listed[0].filename.as_deref(), Some("EULA.pdf"));

		let license = repo.get_license(listed[0].id).await?;
		assert_eq!(license.text, Some(document));
		assert_eq!(license.content_type.as_deref(), Some("application/pdf"));
		Ok(())
	}

	#[tokio::test]
	async fn test_get_missing_license() -> anyhow::Result<()> {
		let db = setup_test_db()?;
		let repo = LicenseRepository::new(db.pool.clone());

		let result = repo.get_license(5).await;
		assert!(matches!(result, Err(InventoryError::NotFound { entity: "license", .. })));
		Ok(())
	}

	#[tokio::test]
	async fn test_unique_licenses_ordered_by_name() -> anyhow::Result<()> {
		let db = setup_test_db()?;
		let libraries = LibraryRepository::new(db.pool.clone());
		let repo = LicenseRepository::new(db.pool.clone());

		for license in ["MIT", "Apache-2.0", "GPL-3.0"] {
			libraries
				.add_libraries(NewLibrary::new("Acme", license, license, "1.0"), None)
				.await?;
		}

		let names: Vec<String> = repo
			.unique_licenses()
			.await?
			.into_iter()
			.map(|l| l.license_name)
			.collect();
		assert_eq!(names, ["Apache-2.0", "GPL-3.0", "MIT"]);
		Ok(())
	}
}
