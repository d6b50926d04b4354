// src/models/library.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryVendor {
	pub id: i64,
	pub vendor: String,
}

/// A license record. The attached document is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
	pub id: i64,
	pub license_name: String,
	#[serde(skip)]
	pub text: Option<Vec<u8>>,
	pub filename: Option<String>,
	pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
	pub id: i64,
	pub library_name: String,
	pub language: Option<String>,
	pub library_vendor_id: i64,
	pub license_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryVersion {
	pub id: i64,
	pub library_id: i64,
	pub library_version: String,
	/// Secunia advisory identifier, when one is known.
	pub secunia: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationVersion {
	pub id: i64,
	pub application_name: String,
	pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDependency {
	pub id: i64,
	pub application_version_id: i64,
	pub library_version_id: i64,
}

/// A vendor together with its libraries, as returned by the hierarchy reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorNode {
	pub vendor: LibraryVendor,
	pub libraries: Vec<LibraryNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryNode {
	pub library: Library,
	pub versions: Vec<LibraryVersion>,
}

/// Outcome of removing a single library version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryRemoval {
	pub library_id: i64,
	pub dependencies_removed: usize,
	pub library_removed: bool,
}
