// src/repositories/rows.rs
//
// Column lists and row mappers shared by the repositories. Each mapper reads
// its columns starting at index 0, in the order of the matching column list.

use crate::models::library::{
	ApplicationDependency, ApplicationVersion, Library, LibraryVendor, LibraryVersion, License,
};
use rusqlite::Row;

pub const VENDOR_COLUMNS: &str = "id, vendor";
pub const LICENSE_COLUMNS: &str = "id, license_name, text, filename, content_type";
pub const LIBRARY_COLUMNS: &str = "id, library_name, language, library_vendor_id, license_id";
pub const VERSION_COLUMNS: &str = "id, library_id, library_version, secunia";
pub const APPLICATION_VERSION_COLUMNS: &str = "id, application_name, version";
pub const DEPENDENCY_COLUMNS: &str = "id, application_version_id, library_version_id";

pub fn vendor_from_row(row: &Row<'_>) -> rusqlite::Result<LibraryVendor> {
	Ok(LibraryVendor {
		id: row.get(0)?,
		vendor: row.get(1)?,
	})
}

pub fn license_from_row(row: &Row<'_>) -> rusqlite::Result<License> {
	Ok(License {
		id: row.get(0)?,
		license_name: row.get(1)?,
		text: row.get(2)?,
		filename: row.get(3)?,
		content_type: row.get(4)?,
	})
}

pub fn library_from_row(row: &Row<'_>) -> rusqlite::Result<Library> {
	Ok(Library {
		id: row.get(0)?,
		library_name: row.get(1)?,
		language: row.get(2)?,
		library_vendor_id: row.get(3)?,
		license_id: row.get(4)?,
	})
}

pub fn version_from_row(row: &Row<'_>) -> rusqlite::Result<LibraryVersion> {
	Ok(LibraryVersion {
		id: row.get(0)?,
		library_id: row.get(1)?,
		library_version: row.get(2)?,
		secunia: row.get(3)?,
	})
}

pub fn application_version_from_row(row: &Row<'_>) -> rusqlite::Result<ApplicationVersion> {
	Ok(ApplicationVersion {
		id: row.get(0)?,
		application_name: row.get(1)?,
		version: row.get(2)?,
	})
}

pub fn dependency_from_row(row: &Row<'_>) -> rusqlite::Result<ApplicationDependency> {
	Ok(ApplicationDependency {
		id: row.get(0)?,
		application_version_id: row.get(1)?,
		library_version_id: row.get(2)?,
	})
}
