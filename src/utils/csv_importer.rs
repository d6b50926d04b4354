// src/utils/csv_importer.rs

use crate::models::upload::{NewLibrary, UploadedFile};
use crate::repositories::library_repo::LibraryRepository;
use anyhow::{anyhow, Context, Error, Result};
use csv::ReaderBuilder;
use log::{info, warn};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tokio::task;

const EXPECTED_HEADERS: [&str; 7] = ["Vendor", "Library", "Version", "License", "Language", "Secunia", "LicenseFile"];

/// The first four columns are mandatory in every file.
const REQUIRED_HEADERS: usize = 4;

/// Represents a row of an inventory CSV file.
#[derive(Debug, Deserialize)]
pub struct LibraryCsvRecord {
	#[serde(rename = "Vendor")]
	pub vendor: String,

	#[serde(rename = "Library")]
	pub library: String,

	#[serde(rename = "Version")]
	pub version: String,

	#[serde(rename = "License")]
	pub license: String,

	#[serde(rename = "Language", default)]
	pub language: Option<String>,

	#[serde(rename = "Secunia", default)]
	pub secunia: Option<String>,

	#[serde(rename = "LicenseFile", default)]
	pub license_file: Option<String>,
}

/// A validated row, ready to hand to the repository.
#[derive(Debug, PartialEq)]
struct ImportRow {
	line_number: usize,
	library: NewLibrary,
	license_file: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
	pub imported: usize,
	pub skipped: usize,
}

/// Imports libraries from an inventory CSV file.
///
/// Each valid row is upserted through [`LibraryRepository::add_libraries`].
/// Rows that fail validation, or whose license file cannot be read, are
/// logged and skipped. A malformed header aborts the import.
pub async fn import_libraries_from_csv(file_path: PathBuf, repo: &LibraryRepository) -> Result<ImportSummary> {
	let base_dir = file_path
		.parent()
		.map(Path::to_path_buf)
		.unwrap_or_default();

	let (rows, mut skipped) = task::spawn_blocking(move || read_rows(&file_path))
		.await
		.context("Failed to run import task")??;

	let mut imported = 0;
	for row in rows {
		let upload = match &row.license_file {
			Some(relative) => match UploadedFile::from_path(&base_dir.join(relative)) {
				Ok(file) => Some(file),
				Err(e) => {
					warn!("Skipping record at line {}: license file {:?}: {}", row.line_number, relative, e);
					skipped += 1;
					continue;
				}
			},
			None => None,
		};

		match repo.add_libraries(row.library, upload).await {
			Ok(_) => imported += 1,
			Err(e) => {
				warn!("Skipping record at line {}: {}", row.line_number, e);
				skipped += 1;
			}
		}
	}

	info!("Import completed. Imported {} libraries, skipped {} records.", imported, skipped);
	Ok(ImportSummary { imported, skipped })
}

/// Parses the file into validated rows, returning them with the count of rows rejected.
fn read_rows(file_path: &Path) -> Result<(Vec<ImportRow>, usize), Error> {
	let file = File::open(file_path)
		.with_context(|| format!("Failed to open CSV file {:?}", file_path))?;

	let mut rdr = ReaderBuilder::new()
		.trim(csv::Trim::All)
		.flexible(true)
		.from_reader(file);

	validate_csv_headers(&mut rdr)?;

	let mut rows = Vec::new();
	let mut skipped = 0;

	// Line 1 is the header.
	for (index, result) in rdr.deserialize::<LibraryCsvRecord>().enumerate() {
		let line_number = index + 2;
		match process_csv_record(result, line_number) {
			Ok(row) => rows.push(row),
			Err(e) => {
				warn!("Skipping invalid record at line {}: {}", line_number, e);
				skipped += 1;
			}
		}
	}

	Ok((rows, skipped))
}

/// Validates that the CSV headers match the expected headers.
fn validate_csv_headers<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> Result<()> {
	let headers = rdr.headers().context("Failed to read CSV headers")?;

	if headers.len() < REQUIRED_HEADERS {
		return Err(anyhow!(
			"Expected at least {} columns, found {}",
			REQUIRED_HEADERS,
			headers.len()
		));
	}

	for (expected, actual) in EXPECTED_HEADERS.iter().zip(headers.iter()) {
		if !expected.eq_ignore_ascii_case(actual) {
			return Err(anyhow!(
				"Unexpected header. Expected '{}', found '{}'",
				expected,
				actual
			));
		}
	}
	Ok(())
}

/// Processes a single CSV record into an import row.
fn process_csv_record(record_result: csv::Result<LibraryCsvRecord>, line_number: usize) -> Result<ImportRow, Error> {
	let record = record_result.context("Failed to deserialize CSV record")?;

	for (field, value) in [
		("Vendor", &record.vendor),
		("Library", &record.library),
		("Version", &record.version),
		("License", &record.license),
	] {
		if value.trim().is_empty() {
			return Err(anyhow!("Missing {} at line {}", field, line_number));
		}
	}

	let secunia = match record.secunia.and_then(non_empty_string) {
		Some(raw) => Some(
			raw.parse::<i64>()
				.with_context(|| format!("Invalid Secunia id '{}' at line {}", raw, line_number))?,
		),
		None => None,
	};

	let mut library = NewLibrary::new(record.vendor, record.license, record.library, record.version);
	library.language = record.language.and_then(non_empty_string);
	library.secunia = secunia;

	Ok(ImportRow {
		line_number,
		library,
		license_file: record.license_file.and_then(non_empty_string).map(PathBuf::from),
	})
}

/// Converts a string to an `Option<String>`, returning `None` if the string is empty or whitespace.
fn non_empty_string(s: String) -> Option<String> {
	let trimmed = s.trim();
	if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::repositories::license_repo::LicenseRepository;
	use crate::test_support::setup_test_db;
	use tempfile::tempdir;

	fn record(vendor: &str, library: &str, version: &str, license: &str) -> LibraryCsvRecord {
		LibraryCsvRecord {
			vendor: vendor.to_string(),
			library: library.to_string(),
			version: version.to_string(),
			license: license.to_string(),
			language: None,
			secunia: None,
			license_file: None,
		}
	}

	#[test]
	fn test_non_empty_string() {
		assert_eq!(non_empty_string(" Java ".to_string()), Some("Java".to_string()));
		assert_eq!(non_empty_string("  ".to_string()), None);
		assert_eq!(non_empty_string("".to_string()), None);
	}

	#[test]
	fn test_process_csv_record() {
		let mut valid = record("Apache", "commons-io", "2.4", "Apache-2.0");
		valid.language = Some("Java".to_string());
		valid.secunia = Some("51712".to_string());
		valid.license_file = Some("licenses/apache.txt".to_string());

		let row = process_csv_record(Ok(valid), 2).unwrap();
		assert_eq!(row.line_number, 2);
		assert_eq!(row.library.vendor, "Apache");
		assert_eq!(row.library.language.as_deref(), Some("Java"));
		assert_eq!(row.library.secunia, Some(51712));
		assert_eq!(row.license_file, Some(PathBuf::from("licenses/apache.txt")));
	}

	#[test]
	fn test_process_csv_record_rejects_bad_rows() {
		assert!(process_csv_record(Ok(record("Apache", "", "2.4", "Apache-2.0")), 3).is_err());

		let mut bad_secunia = record("Apache", "commons-io", "2.4", "Apache-2.0");
		bad_secunia.secunia = Some("SA-1".to_string());
		assert!(process_csv_record(Ok(bad_secunia), 4).is_err());
	}

	#[test]
	fn test_validate_csv_headers() {
		let mut good = ReaderBuilder::new().from_reader("vendor,library,version,license\n".as_bytes());
		assert!(validate_csv_headers(&mut good).is_ok());

		let mut short = ReaderBuilder::new().from_reader("Vendor,Library\n".as_bytes());
		assert!(validate_csv_headers(&mut short).is_err());

		let mut wrong = ReaderBuilder::new().from_reader("Vendor,Product,Version,License\n".as_bytes());
		assert!(validate_csv_headers(&mut wrong).is_err());
	}

	#[tokio::test]
	async fn test_import_libraries_from_csv() -> Result<()> {
		let db = setup_test_db()?;
		let repo = LibraryRepository::new(db.pool.clone());

		let dir = tempdir()?;
		std::fs::write(dir.path().join("MIT.txt"), b"MIT License text")?;
		let csv_path = dir.path().join("inventory.csv");
		std::fs::write(
			&csv_path,
			"Vendor,Library,Version,License,Language,Secunia,LicenseFile\n\
			 Pallets,flask,2.3.2,BSD-3-Clause,Python,,\n\
			 pallets,Flask,2.3.3,bsd-3-clause,Python,55012,\n\
			 Acme,widgets,1.0,MIT,Rust,,MIT.txt\n\
			 Acme,gadgets,1.0,GPL-2.0,Rust,,missing.txt\n\
			 Acme,,1.0,MIT,,,\n",
		)?;

		let summary = import_libraries_from_csv(csv_path, &repo).await?;
		assert_eq!(summary, ImportSummary { imported: 3, skipped: 2 });

		let hierarchy = repo.get_library_hierarchy().await?;
		assert_eq!(hierarchy.len(), 2);
		assert_eq!(hierarchy[1].vendor.vendor, "Pallets");
		assert_eq!(hierarchy[1].libraries.len(), 1);
		assert_eq!(hierarchy[1].libraries[0].versions.len(), 2);

		let licenses = LicenseRepository::new(db.pool.clone());
		let mit = licenses
			.unique_licenses()
			.await?
			.into_iter()
			.find(|l| l.license_name == "MIT")
			.ok_or_else(|| anyhow!("MIT license missing"))?;
		let stored = licenses.get_license(mit.id).await?;
		assert_eq!(stored.text.as_deref(), Some(b"MIT License text".as_slice()));
		Ok(())
	}

	#[tokio::test]
	async fn test_import_rejects_bad_header() -> Result<()> {
		let db = setup_test_db()?;
		let repo = LibraryRepository::new(db.pool.clone());

		let dir = tempdir()?;
		let csv_path = dir.path().join("bad.csv");
		std::fs::write(&csv_path, "Name,Status,Description,References\nx,y,z,w\n")?;

		assert!(import_libraries_from_csv(csv_path, &repo).await.is_err());
		Ok(())
	}
}
