// src/main.rs

use anyhow::{Context, Result};
use library_inventory_db::config::Config;
use library_inventory_db::db::connection::{self, SqlitePool};
use library_inventory_db::db::schema;
use library_inventory_db::repositories::library_repo::LibraryRepository;
use library_inventory_db::utils::csv_importer::import_libraries_from_csv;
use library_inventory_db::utils::logger;
use log::{error, info};
use std::sync::Arc;

struct App {
	config: Config,
	pool: Arc<SqlitePool>,
}

impl App {
	fn new() -> Result<Self> {
		logger::init();
		info!("Starting library inventory");

		let config = Config::from_env().context("Failed to load configuration")?;
		let pool = Arc::new(
			connection::establish_pool(&config)
				.context("Failed to establish database connection pool")?,
		);

		Ok(App { config, pool })
	}

	fn init_database(&self) -> Result<()> {
		let conn = self.pool.get().context("Failed to get database connection")?;
		schema::create_tables(&conn).context("Failed to create database tables")?;
		info!("Database tables initialized successfully");
		Ok(())
	}

	async fn import_seed_data(&self, repo: &LibraryRepository) -> Result<()> {
		let Some(csv_path) = self.config.import_csv.clone() else {
			return Ok(());
		};

		info!("Importing library inventory from {:?}", csv_path);
		let summary = import_libraries_from_csv(csv_path, repo)
			.await
			.context("Failed to import library inventory")?;
		info!("Imported {} libraries ({} records skipped)", summary.imported, summary.skipped);
		Ok(())
	}

	async fn run(&self) -> Result<()> {
		self.init_database()?;

		let repo = LibraryRepository::new(self.pool.clone());
		self.import_seed_data(&repo).await?;

		let hierarchy = repo
			.get_library_hierarchy()
			.await
			.context("Failed to load library hierarchy")?;
		info!("Inventory holds {} vendors", hierarchy.len());

		let json = serde_json::to_string_pretty(&hierarchy).context("Failed to serialize library hierarchy")?;
		println!("{}", json);
		Ok(())
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	let app = App::new()?;
	if let Err(e) = app.run().await {
		error!("Library inventory failed: {:#}", e);
		return Err(e);
	}
	Ok(())
}
