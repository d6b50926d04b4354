// src/error.rs

use rusqlite::ffi;
use thiserror::Error;

/// Errors surfaced by the inventory store.
#[derive(Debug, Error)]
pub enum InventoryError {
	#[error("{entity} {id} not found")]
	NotFound { entity: &'static str, id: String },

	#[error("Conflicting record: {0}")]
	Conflict(String),

	#[error("Invalid {field}: {reason}")]
	Validation { field: &'static str, reason: String },

	#[error("Database error: {0}")]
	Storage(rusqlite::Error),

	#[error("Failed to get database connection: {0}")]
	Pool(#[from] r2d2::Error),

	#[error("Failed to read upload: {0}")]
	Io(#[from] std::io::Error),

	#[error("Database task failed: {0}")]
	Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, InventoryError>;

impl InventoryError {
	pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
		Self::NotFound { entity, id: id.to_string() }
	}

	pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
		Self::Validation { field, reason: reason.into() }
	}
}

impl From<rusqlite::Error> for InventoryError {
	fn from(err: rusqlite::Error) -> Self {
		if let rusqlite::Error::SqliteFailure(cause, message) = &err {
			if cause.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
				|| cause.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
			{
				return Self::Conflict(message.clone().unwrap_or_else(|| cause.to_string()));
			}
		}
		Self::Storage(err)
	}
}

/// Rejects names that are empty once surrounding whitespace is removed.
pub(crate) fn require_name(field: &'static str, value: &str) -> Result<()> {
	if value.trim().is_empty() {
		return Err(InventoryError::validation(field, "must not be blank"));
	}
	Ok(())
}
