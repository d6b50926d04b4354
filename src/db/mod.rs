pub mod connection;
pub mod schema;
pub mod transaction;
