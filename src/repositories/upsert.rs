// src/repositories/upsert.rs
//
// Find-or-create helpers. Each one inserts with ON CONFLICT DO NOTHING and then
// selects the surviving row, so concurrent callers racing on the same natural
// key both end up bound to a single row.

use super::rows::{
	application_version_from_row, library_from_row, license_from_row, vendor_from_row,
	version_from_row, APPLICATION_VERSION_COLUMNS, LIBRARY_COLUMNS, LICENSE_COLUMNS,
	VENDOR_COLUMNS, VERSION_COLUMNS,
};
use crate::error::Result;
use crate::models::library::{ApplicationVersion, Library, LibraryVendor, LibraryVersion, License};
use crate::models::upload::UploadedFile;
use log::info;
use rusqlite::{params, Transaction};

pub fn find_or_create_vendor(tx: &Transaction<'_>, vendor: &str) -> Result<LibraryVendor> {
	let vendor = vendor.trim();

	let inserted = tx.execute(
		"INSERT INTO library_vendors (vendor) VALUES (?1) ON CONFLICT DO NOTHING",
		params![vendor],
	)?;

	let row = tx.query_row(
		&format!("SELECT {} FROM library_vendors WHERE vendor = ?1", VENDOR_COLUMNS),
		params![vendor],
		vendor_from_row,
	)?;

	if inserted == 1 {
		info!("Created library vendor '{}' (id {})", row.vendor, row.id);
	}
	Ok(row)
}

/// The uploaded document is stored only when the license row is created here.
/// An absent or empty upload leaves the blob and its metadata unset.
pub fn find_or_create_license(
	tx: &Transaction<'_>,
	license_name: &str,
	upload: Option<&UploadedFile>,
) -> Result<License> {
	let license_name = license_name.trim();
	let upload = upload.filter(|file| !file.is_empty());

	let inserted = tx.execute(
		"INSERT INTO licenses (license_name, text, filename, content_type)
		 VALUES (?1, ?2, ?3, ?4)
		 ON CONFLICT DO NOTHING",
		params![
			license_name,
			upload.map(|file| file.bytes.as_slice()),
			upload.and_then(|file| file.filename.as_deref()),
			upload.and_then(|file| file.content_type.as_deref()),
		],
	)?;

	let row = tx.query_row(
		&format!("SELECT {} FROM licenses WHERE license_name = ?1", LICENSE_COLUMNS),
		params![license_name],
		license_from_row,
	)?;

	if inserted == 1 {
		info!(
			"Created license '{}' (id {}) with {} byte document",
			row.license_name,
			row.id,
			row.text.as_ref().map_or(0, Vec::len)
		);
	}
	Ok(row)
}

pub fn find_or_create_library(
	tx: &Transaction<'_>,
	library_name: &str,
	vendor_id: i64,
	license_id: i64,
	language: Option<&str>,
) -> Result<Library> {
	let library_name = library_name.trim();

	let inserted = tx.execute(
		"INSERT INTO libraries (library_name, language, library_vendor_id, license_id)
		 VALUES (?1, ?2, ?3, ?4)
		 ON CONFLICT DO NOTHING",
		params![library_name, language, vendor_id, license_id],
	)?;

	let row = tx.query_row(
		&format!(
			"SELECT {} FROM libraries WHERE library_vendor_id = ?1 AND library_name = ?2",
			LIBRARY_COLUMNS
		),
		params![vendor_id, library_name],
		library_from_row,
	)?;

	if inserted == 1 {
		info!("Created library '{}' (id {})", row.library_name, row.id);
	}
	Ok(row)
}

pub fn find_or_create_version(
	tx: &Transaction<'_>,
	library_id: i64,
	library_version: &str,
	secunia: Option<i64>,
) -> Result<LibraryVersion> {
	let library_version = library_version.trim();

	let inserted = tx.execute(
		"INSERT INTO library_versions (library_id, library_version, secunia)
		 VALUES (?1, ?2, ?3)
		 ON CONFLICT DO NOTHING",
		params![library_id, library_version, secunia],
	)?;

	let row = tx.query_row(
		&format!(
			"SELECT {} FROM library_versions WHERE library_id = ?1 AND library_version = ?2",
			VERSION_COLUMNS
		),
		params![library_id, library_version],
		version_from_row,
	)?;

	if inserted == 1 {
		info!("Created library version '{}' (id {}) for library {}", row.library_version, row.id, library_id);
	}
	Ok(row)
}

pub fn find_or_create_application_version(
	tx: &Transaction<'_>,
	application_name: &str,
	version: &str,
) -> Result<ApplicationVersion> {
	let application_name = application_name.trim();
	let version = version.trim();

	tx.execute(
		"INSERT INTO application_versions (application_name, version)
		 VALUES (?1, ?2)
		 ON CONFLICT DO NOTHING",
		params![application_name, version],
	)?;

	let row = tx.query_row(
		&format!(
			"SELECT {} FROM application_versions WHERE application_name = ?1 AND version = ?2",
			APPLICATION_VERSION_COLUMNS
		),
		params![application_name, version],
		application_version_from_row,
	)?;
	Ok(row)
}
