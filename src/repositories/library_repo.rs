// src/repositories/library_repo.rs

use super::rows::{
	library_from_row, vendor_from_row, version_from_row, LIBRARY_COLUMNS, VENDOR_COLUMNS,
	VERSION_COLUMNS,
};
use super::upsert;
use crate::db::connection::SqlitePool;
use crate::db::transaction::{with_connection, with_transaction};
use crate::error::{require_name, InventoryError, Result};
use crate::models::library::{
	Library, LibraryNode, LibraryRemoval, LibraryVendor, LibraryVersion, VendorNode,
};
use crate::models::upload::{LibraryUpdate, NewLibrary, UploadedFile};
use log::{debug, info};
use rusqlite::{params, OptionalExtension, Transaction};
use std::sync::Arc;

/// Treats a blank language as no language at all.
fn normalize_language(language: Option<String>) -> Option<String> {
	language
		.map(|l| l.trim().to_string())
		.filter(|l| !l.is_empty())
}

/// Returns the last node, appending `new_node()` first unless the last node matches.
///
/// Rows arrive sorted, so every child of a node follows it directly.
fn last_matching_or_push<T>(
	nodes: &mut Vec<T>,
	matches: impl Fn(&T) -> bool,
	new_node: impl FnOnce() -> T,
) -> &mut T {
	if nodes.last().map_or(true, |node| !matches(node)) {
		nodes.push(new_node());
	}
	let last = nodes.len() - 1;
	&mut nodes[last]
}

/// Deletes the library when no versions reference it any more.
fn remove_library_if_empty(tx: &Transaction<'_>, library_id: i64) -> Result<bool> {
	let remaining: i64 = tx.query_row(
		"SELECT COUNT(*) FROM library_versions WHERE library_id = ?1",
		params![library_id],
		|row| row.get(0),
	)?;

	if remaining > 0 {
		return Ok(false);
	}
	Ok(tx.execute("DELETE FROM libraries WHERE id = ?1", params![library_id])? == 1)
}

/// Fails with `NotFound` unless a by-id statement touched exactly one row.
fn expect_single_row(affected: usize, entity: &'static str, id: i64) -> Result<()> {
	if affected != 1 {
		return Err(InventoryError::not_found(entity, id));
	}
	Ok(())
}

pub struct LibraryRepository {
	pool: Arc<SqlitePool>,
}

impl LibraryRepository {
	pub fn new(pool: Arc<SqlitePool>) -> Self {
		Self { pool }
	}

	/// Returns every vendor with its libraries and their versions.
	///
	/// Vendors are ordered by name, libraries by name within a vendor and
	/// versions by version string within a library. Vendors without libraries
	/// and libraries without versions are included with empty children.
	pub async fn get_library_hierarchy(&self) -> Result<Vec<VendorNode>> {
		with_connection(&self.pool, |conn| {
			let mut stmt = conn.prepare(
				"SELECT
					v.id,
					v.vendor,
					l.id,
					l.library_name,
					l.language,
					l.library_vendor_id,
					l.license_id,
					lv.id,
					lv.library_id,
					lv.library_version,
					lv.secunia
				FROM library_vendors v
				LEFT JOIN libraries l ON l.library_vendor_id = v.id
				LEFT JOIN library_versions lv ON lv.library_id = l.id
				ORDER BY v.vendor, v.id, l.library_name, l.id, lv.library_version, lv.id"
			)?;

			let rows = stmt.query_map([], |row| {
				let vendor = LibraryVendor {
					id: row.get(0)?,
					vendor: row.get(1)?,
				};

				let library = match row.get::<_, Option<i64>>(2)? {
					Some(id) => Some(Library {
						id,
						library_name: row.get(3)?,
						language: row.get(4)?,
						library_vendor_id: row.get(5)?,
						license_id: row.get(6)?,
					}),
					None => None,
				};

				let version = match row.get::<_, Option<i64>>(7)? {
					Some(id) => Some(LibraryVersion {
						id,
						library_id: row.get(8)?,
						library_version: row.get(9)?,
						secunia: row.get(10)?,
					}),
					None => None,
				};

				Ok((vendor, library, version))
			})?;

			let mut hierarchy: Vec<VendorNode> = Vec::new();

			for row_result in rows {
				let (vendor, library, version) = row_result?;

				let vendor_id = vendor.id;
				let vendor_node = last_matching_or_push(
					&mut hierarchy,
					|node| node.vendor.id == vendor_id,
					|| VendorNode { vendor, libraries: Vec::new() },
				);

				// Vendor without libraries.
				let Some(library) = library else { continue };

				let library_id = library.id;
				let library_node = last_matching_or_push(
					&mut vendor_node.libraries,
					|node| node.library.id == library_id,
					|| LibraryNode { library, versions: Vec::new() },
				);

				if let Some(version) = version {
					library_node.versions.push(version);
				}
			}

			debug!("Loaded library hierarchy with {} vendors", hierarchy.len());
			Ok(hierarchy)
		})
			.await
	}

	/// Returns all vendors ordered by name
	pub async fn get_vendors(&self) -> Result<Vec<LibraryVendor>> {
		self.query_list(
			format!("SELECT {} FROM library_vendors ORDER BY vendor", VENDOR_COLUMNS),
			None,
			vendor_from_row,
		)
			.await
	}

	/// Returns the libraries published by a vendor, ordered by name
	pub async fn get_libraries(&self, vendor_id: i64) -> Result<Vec<Library>> {
		self.query_list(
			format!(
				"SELECT {} FROM libraries WHERE library_vendor_id = ?1 ORDER BY library_name",
				LIBRARY_COLUMNS
			),
			Some(vendor_id),
			library_from_row,
		)
			.await
	}

	/// Returns the versions of a library, ordered by version string
	pub async fn get_versions(&self, library_id: i64) -> Result<Vec<LibraryVersion>> {
		self.query_list(
			format!(
				"SELECT {} FROM library_versions WHERE library_id = ?1 ORDER BY library_version",
				VERSION_COLUMNS
			),
			Some(library_id),
			version_from_row,
		)
			.await
	}

	pub async fn all_library_versions(&self) -> Result<Vec<LibraryVersion>> {
		self.query_list(
			format!("SELECT {} FROM library_versions ORDER BY id", VERSION_COLUMNS),
			None,
			version_from_row,
		)
			.await
	}

	pub async fn unique_libraries(&self) -> Result<Vec<Library>> {
		self.query_list(
			format!("SELECT DISTINCT {} FROM libraries ORDER BY library_name", LIBRARY_COLUMNS),
			None,
			library_from_row,
		)
			.await
	}

	pub async fn unique_vendors(&self) -> Result<Vec<LibraryVendor>> {
		self.query_list(
			format!("SELECT DISTINCT {} FROM library_vendors ORDER BY vendor", VENDOR_COLUMNS),
			None,
			vendor_from_row,
		)
			.await
	}

	/// Distinct languages across all libraries; libraries without one are ignored.
	pub async fn unique_languages(&self) -> Result<Vec<String>> {
		self.query_list(
			"SELECT DISTINCT language FROM libraries WHERE language IS NOT NULL ORDER BY language".to_string(),
			None,
			|row| row.get(0),
		)
			.await
	}

	pub async fn unique_versions(&self) -> Result<Vec<String>> {
		self.query_list(
			"SELECT DISTINCT library_version FROM library_versions ORDER BY library_version".to_string(),
			None,
			|row| row.get(0),
		)
			.await
	}

	/// Creates the vendor, license, library and version named by `new_library`,
	/// reusing any that already exist, and returns the resulting version.
	///
	/// Names are matched ignoring case. The upload is attached only when the
	/// license is created by this call, the language only when the library is,
	/// and the advisory id only when the version is.
	pub async fn add_libraries(
		&self,
		new_library: NewLibrary,
		upload: Option<UploadedFile>,
	) -> Result<LibraryVersion> {
		require_name("vendor", &new_library.vendor)?;
		require_name("license", &new_library.license)?;
		require_name("library name", &new_library.library_name)?;
		require_name("library version", &new_library.library_version)?;
		if let Some(file) = &upload {
			file.validate()?;
		}

		let language = normalize_language(new_library.language.clone());

		with_transaction(&self.pool, move |tx| {
			let vendor = upsert::find_or_create_vendor(tx, &new_library.vendor)?;
			let license = upsert::find_or_create_license(tx, &new_library.license, upload.as_ref())?;
			let library = upsert::find_or_create_library(
				tx,
				&new_library.library_name,
				vendor.id,
				license.id,
				language.as_deref(),
			)?;
			upsert::find_or_create_version(tx, library.id, &new_library.library_version, new_library.secunia)
		})
			.await
	}

	/// Rewrites a vendor, license, library and version in one transaction.
	///
	/// The license document is replaced only when a non-empty upload is given.
	/// Any missing row or name collision rolls back every change.
	pub async fn update_library(&self, update: LibraryUpdate, upload: Option<UploadedFile>) -> Result<()> {
		require_name("vendor", &update.vendor)?;
		require_name("license", &update.license)?;
		require_name("library name", &update.library_name)?;
		require_name("library version", &update.library_version)?;
		if let Some(file) = &upload {
			file.validate()?;
		}

		let language = normalize_language(update.language.clone());
		let upload = upload.filter(|file| !file.is_empty());

		with_transaction(&self.pool, move |tx| {
			let previous_library_id: Option<i64> = tx
				.query_row(
					"SELECT library_id FROM library_versions WHERE id = ?1",
					params![update.library_version_id],
					|row| row.get(0),
				)
				.optional()?;

			let updated = tx.execute(
				"UPDATE library_vendors SET vendor = ?1 WHERE id = ?2",
				params![update.vendor.trim(), update.vendor_id],
			)?;
			expect_single_row(updated, "library vendor", update.vendor_id)?;

			let updated = match &upload {
				Some(file) => tx.execute(
					"UPDATE licenses
					 SET license_name = ?1, text = ?2, filename = ?3, content_type = ?4
					 WHERE id = ?5",
					params![
						update.license.trim(),
						file.bytes,
						file.filename,
						file.content_type,
						update.license_id,
					],
				)?,
				None => tx.execute(
					"UPDATE licenses SET license_name = ?1 WHERE id = ?2",
					params![update.license.trim(), update.license_id],
				)?,
			};
			expect_single_row(updated, "license", update.license_id)?;

			let updated = tx.execute(
				"UPDATE libraries
				 SET library_name = ?1, license_id = ?2, library_vendor_id = ?3, language = ?4
				 WHERE id = ?5",
				params![
					update.library_name.trim(),
					update.license_id,
					update.vendor_id,
					language,
					update.library_id,
				],
			)?;
			expect_single_row(updated, "library", update.library_id)?;

			let updated = tx.execute(
				"UPDATE library_versions
				 SET library_version = ?1, secunia = ?2, library_id = ?3
				 WHERE id = ?4",
				params![
					update.library_version.trim(),
					update.secunia,
					update.library_id,
					update.library_version_id,
				],
			)?;
			expect_single_row(updated, "library version", update.library_version_id)?;

			// The version may have moved away from its previous library.
			if let Some(previous) = previous_library_id.filter(|id| *id != update.library_id) {
				if remove_library_if_empty(tx, previous)? {
					info!("Removed library {} after its last version moved to library {}", previous, update.library_id);
				}
			}

			info!(
				"Updated library {} (version {}, vendor {}, license {})",
				update.library_id, update.library_version_id, update.vendor_id, update.license_id
			);
			Ok(())
		})
			.await
	}

	/// Removes a library version together with the dependency links on it.
	///
	/// The owning library is removed as well once its last version is gone.
	pub async fn remove_library(&self, library_version_id: i64) -> Result<LibraryRemoval> {
		with_transaction(&self.pool, move |tx| {
			let library_id: i64 = tx
				.query_row(
					"SELECT library_id FROM library_versions WHERE id = ?1",
					params![library_version_id],
					|row| row.get(0),
				)
				.optional()?
				.ok_or_else(|| InventoryError::not_found("library version", library_version_id))?;

			let dependencies_removed = tx.execute(
				"DELETE FROM application_dependencies WHERE library_version_id = ?1",
				params![library_version_id],
			)?;

			tx.execute("DELETE FROM library_versions WHERE id = ?1", params![library_version_id])?;

			let library_removed = remove_library_if_empty(tx, library_id)?;

			info!(
				"Removed library version {} ({} dependencies, library {} removed: {})",
				library_version_id, dependencies_removed, library_id, library_removed
			);

			Ok(LibraryRemoval { library_id, dependencies_removed, library_removed })
		})
			.await
	}

	async fn query_list<T, F>(&self, sql: String, filter: Option<i64>, map_row: F) -> Result<Vec<T>>
	where
		T: Send + 'static,
		F: Fn(&rusqlite::Row<'_>) -> rusqlite::Result<T> + Send + 'static,
	{
		with_connection(&self.pool, move |conn| {
			let mut stmt = conn.prepare(&sql)?;
			let rows = match filter {
				Some(id) => stmt.query_map(params![id], map_row)?,
				None => stmt.query_map([], map_row)?,
			};
			Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
		})
			.await
	}
}
