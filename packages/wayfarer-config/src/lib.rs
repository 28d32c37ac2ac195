mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Search, SearchCache, Service, Storage, Telemetry};

use std::{collections::HashSet, fs, path::Path};

const MAX_DEBOUNCE_MS: u64 = 10_000;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.search.min_query_length == 0 {
		return Err(Error::Validation {
			message: "search.min_query_length must be greater than zero.".to_string(),
		});
	}
	if cfg.search.suggestion_min_length == 0 {
		return Err(Error::Validation {
			message: "search.suggestion_min_length must be greater than zero.".to_string(),
		});
	}
	if cfg.search.suggestion_min_length > cfg.search.min_query_length {
		return Err(Error::Validation {
			message: "search.suggestion_min_length must not exceed search.min_query_length."
				.to_string(),
		});
	}
	if cfg.search.max_results == 0 {
		return Err(Error::Validation {
			message: "search.max_results must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_suggestions == 0 {
		return Err(Error::Validation {
			message: "search.max_suggestions must be greater than zero.".to_string(),
		});
	}
	if cfg.search.debounce_ms > MAX_DEBOUNCE_MS {
		return Err(Error::Validation {
			message: format!("search.debounce_ms must be {MAX_DEBOUNCE_MS} or less."),
		});
	}

	if let Some(max) = cfg.search.cache.max_entries
		&& max == 0
	{
		return Err(Error::Validation {
			message: "search.cache.max_entries must be greater than zero.".to_string(),
		});
	}

	if cfg.telemetry.window == 0 {
		return Err(Error::Validation {
			message: "telemetry.window must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.data_dir.as_os_str().is_empty() {
		return Err(Error::Validation {
			message: "storage.data_dir must be non-empty.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let mut seen = HashSet::new();

	cfg.search.category_filter = cfg
		.search
		.category_filter
		.iter()
		.map(|category| category.trim().to_string())
		.filter(|category| !category.is_empty() && seen.insert(category.clone()))
		.collect();
}
