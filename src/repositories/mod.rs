pub mod dependency_repo;
pub mod library_repo;
pub mod license_repo;
mod rows;
mod upsert;
