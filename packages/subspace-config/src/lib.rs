mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Catalog, Config, Postgres, Security, Service, Storage};

use std::{fs, net::SocketAddr, path::Path};

pub const TAG_FILTER_MODES: [&str; 2] = ["all_groups", "merged"];

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
	let http_addr: SocketAddr = cfg.service.http_bind.parse().map_err(|_| Error::Validation {
		message: "service.http_bind must be a socket address.".to_string(),
	})?;

	if cfg.security.bind_localhost_only && !http_addr.ip().is_loopback() {
		return Err(Error::Validation {
			message: "service.http_bind must be a loopback address when security.bind_localhost_only is true."
				.to_string(),
		});
	}
	if cfg.service.log_level.is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.postgres.acquire_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.acquire_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if !TAG_FILTER_MODES.contains(&cfg.catalog.tag_filter_mode.as_str()) {
		return Err(Error::Validation {
			message: "catalog.tag_filter_mode must be one of all_groups or merged.".to_string(),
		});
	}
	if cfg.catalog.load_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "catalog.load_timeout_ms must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.log_level = cfg.service.log_level.trim().to_string();
	cfg.catalog.tag_filter_mode = cfg.catalog.tag_filter_mode.trim().to_ascii_lowercase();
}
