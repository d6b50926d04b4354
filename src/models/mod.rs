pub mod library;
pub mod upload;
