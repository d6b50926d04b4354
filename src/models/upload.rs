// src/models/upload.rs

use crate::error::{InventoryError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound on an attached license document.
pub const MAX_UPLOAD_SIZE: usize = 16 * 1024 * 1024;

/// An uploaded license document, fully read into memory.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadedFile {
	pub filename: Option<String>,
	pub content_type: Option<String>,
	pub bytes: Vec<u8>,
}

impl UploadedFile {
	pub fn new(filename: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
		Self {
			filename: Some(filename.into()),
			content_type: Some(content_type.into()),
			bytes,
		}
	}

	/// Reads a license document from disk, guessing its content type from the extension.
	pub fn from_path(path: &Path) -> Result<Self> {
		let metadata = std::fs::metadata(path)?;
		if metadata.len() > MAX_UPLOAD_SIZE as u64 {
			return Err(InventoryError::validation(
				"license file",
				format!("{} exceeds {} bytes", path.display(), MAX_UPLOAD_SIZE),
			));
		}

		let bytes = std::fs::read(path)?;
		Ok(Self {
			filename: path.file_name().map(|n| n.to_string_lossy().into_owned()),
			content_type: Some(content_type_for(path).to_string()),
			bytes,
		})
	}

	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}

	pub(crate) fn validate(&self) -> Result<()> {
		if self.bytes.len() > MAX_UPLOAD_SIZE {
			return Err(InventoryError::validation(
				"license file",
				format!("upload of {} bytes exceeds {} bytes", self.bytes.len(), MAX_UPLOAD_SIZE),
			));
		}
		Ok(())
	}
}

fn content_type_for(path: &Path) -> &'static str {
	let extension = path
		.extension()
		.map(|e| e.to_string_lossy().to_lowercase())
		.unwrap_or_default();

	match extension.as_str() {
		"txt" | "md" => "text/plain",
		"html" | "htm" => "text/html",
		"xml" => "application/xml",
		"pdf" => "application/pdf",
		_ => "application/octet-stream",
	}
}

/// Input to the library upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLibrary {
	pub vendor: String,
	pub license: String,
	pub library_name: String,
	pub library_version: String,
	pub language: Option<String>,
	pub secunia: Option<i64>,
}

impl NewLibrary {
	pub fn new(
		vendor: impl Into<String>,
		license: impl Into<String>,
		library_name: impl Into<String>,
		library_version: impl Into<String>,
	) -> Self {
		Self {
			vendor: vendor.into(),
			license: license.into(),
			library_name: library_name.into(),
			library_version: library_version.into(),
			language: None,
			secunia: None,
		}
	}

	pub fn with_language(mut self, language: impl Into<String>) -> Self {
		self.language = Some(language.into());
		self
	}

	pub fn with_secunia(mut self, secunia: i64) -> Self {
		self.secunia = Some(secunia);
		self
	}
}

/// Input to the library update. The ids select the rows, the remaining fields
/// are the new values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryUpdate {
	pub vendor_id: i64,
	pub license_id: i64,
	pub library_id: i64,
	pub library_version_id: i64,
	pub vendor: String,
	pub license: String,
	pub library_name: String,
	pub library_version: String,
	pub language: Option<String>,
	pub secunia: Option<i64>,
}
