pub mod csv_importer;
pub mod logger;
