//! Persistence layer for a software library inventory: vendors, licenses,
//! libraries, library versions and the dependency links from application
//! versions to library versions, stored in SQLite.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repositories;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{InventoryError, Result};
