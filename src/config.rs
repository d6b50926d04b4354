//! Runtime configuration loaded from the environment.

use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;

pub const DATABASE_PATH_VAR: &str = "INVENTORY_DATABASE_PATH";
pub const POOL_SIZE_VAR: &str = "INVENTORY_POOL_SIZE";
pub const IMPORT_CSV_VAR: &str = "INVENTORY_IMPORT_CSV";

const DEFAULT_POOL_SIZE: u32 = 15;
const MAX_POOL_SIZE: u32 = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
	pub database_path: PathBuf,
	pub pool_size: u32,
	pub import_csv: Option<PathBuf>,
}

impl Config {
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|key| env::var(key).ok())
	}

	/// Builds the configuration from an arbitrary variable source.
	fn from_lookup<F>(lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let database_path = lookup(DATABASE_PATH_VAR)
			.filter(|v| !v.trim().is_empty())
			.map(PathBuf::from)
			.unwrap_or_else(default_database_path);

		let pool_size = match lookup(POOL_SIZE_VAR) {
			Some(raw) => parse_pool_size(&raw)?,
			None => DEFAULT_POOL_SIZE,
		};

		let import_csv = lookup(IMPORT_CSV_VAR)
			.filter(|v| !v.trim().is_empty())
			.map(PathBuf::from);

		Ok(Self { database_path, pool_size, import_csv })
	}
}

fn parse_pool_size(raw: &str) -> Result<u32> {
	let size: u32 = raw
		.trim()
		.parse()
		.with_context(|| format!("{} must be a positive integer, got '{}'", POOL_SIZE_VAR, raw))?;

	if size == 0 || size > MAX_POOL_SIZE {
		bail!("{} must be between 1 and {}, got {}", POOL_SIZE_VAR, MAX_POOL_SIZE, size);
	}
	Ok(size)
}

/// Gets the default database path, preferring the platform data directory
fn default_database_path() -> PathBuf {
	match dirs::data_local_dir() {
		Some(dir) => dir.join("library-inventory").join("inventory.db"),
		None => {
			let mut db_path = PathBuf::from(".");
			db_path.push("database");
			db_path.push("inventory.db");
			db_path
		}
	}
}
