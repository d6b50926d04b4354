use rusqlite::Connection;
use anyhow::{Result, Context};
use std::cmp::Ordering;

/// Collation used by every name column. Connections must register it before
/// touching the tables, see [`register_collations`].
pub const NAME_COLLATION: &str = "UNICODE_NOCASE";

/// Orders strings by their Unicode uppercase mapping, so "Müller", "MÜLLER"
/// and "müller" compare equal.
pub fn compare_ignoring_case(a: &str, b: &str) -> Ordering {
	a.chars()
		.flat_map(char::to_uppercase)
		.cmp(b.chars().flat_map(char::to_uppercase))
}

pub fn register_collations(conn: &Connection) -> rusqlite::Result<()> {
	conn.create_collation(NAME_COLLATION, compare_ignoring_case)
}

pub fn create_tables(conn: &Connection) -> Result<()> {
	conn.execute_batch(
		"
		CREATE TABLE IF NOT EXISTS library_vendors (
			id INTEGER PRIMARY KEY AUTOINCREMENT,
			vendor TEXT NOT NULL COLLATE UNICODE_NOCASE UNIQUE
		);

		CREATE TABLE IF NOT EXISTS licenses (
			id INTEGER PRIMARY KEY AUTOINCREMENT,
			license_name TEXT NOT NULL COLLATE UNICODE_NOCASE UNIQUE,
			text BLOB,
			filename TEXT,
			content_type TEXT
		);

		CREATE TABLE IF NOT EXISTS libraries (
			id INTEGER PRIMARY KEY AUTOINCREMENT,
			library_name TEXT NOT NULL COLLATE UNICODE_NOCASE,
			language TEXT,
			library_vendor_id INTEGER NOT NULL REFERENCES library_vendors(id),
			license_id INTEGER REFERENCES licenses(id),
			UNIQUE (library_vendor_id, library_name)
		);

		CREATE TABLE IF NOT EXISTS library_versions (
			id INTEGER PRIMARY KEY AUTOINCREMENT,
			library_id INTEGER NOT NULL REFERENCES libraries(id),
			library_version TEXT NOT NULL,
			secunia INTEGER,
			UNIQUE (library_id, library_version)
		);

		CREATE TABLE IF NOT EXISTS application_versions (
			id INTEGER PRIMARY KEY AUTOINCREMENT,
			application_name TEXT NOT NULL,
			version TEXT NOT NULL,
			UNIQUE (application_name, version)
		);

		CREATE TABLE IF NOT EXISTS application_dependencies (
			id INTEGER PRIMARY KEY AUTOINCREMENT,
			application_version_id INTEGER NOT NULL REFERENCES application_versions(id),
			library_version_id INTEGER NOT NULL REFERENCES library_versions(id),
			UNIQUE (application_version_id, library_version_id)
		);

		CREATE INDEX IF NOT EXISTS idx_library_versions_library
		ON library_versions(library_id);

		CREATE INDEX IF NOT EXISTS idx_application_dependencies_library_version
		ON application_dependencies(library_version_id);
		"
	).context("Failed to create tables")?;

	Ok(())
}
