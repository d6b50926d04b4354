use env_logger::{Builder, Env};

/// Environment variable holding the log filter, e.g. `debug` or `library_inventory_db=trace`.
pub const LOG_FILTER_VAR: &str = "INVENTORY_LOG";

pub fn init() {
	let env = Env::new().filter_or(LOG_FILTER_VAR, "info");

	let result = Builder::from_env(env)
		.format_timestamp_millis()
		.format_module_path(true)
		.try_init();

	if result.is_err() {
		log::debug!("Logger already initialized");
	}
}
