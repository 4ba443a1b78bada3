// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for the Vault server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`VAULT_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use vault_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub auth: AuthConfig,
	pub paths: PathsConfig,
	pub storage: StorageConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`VAULT_SERVER_*`)
/// 2. Config file (`/etc/vault/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

/// Merge the given sources in precedence order and resolve the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize();
	let auth = layer.auth.unwrap_or_default().finalize();
	let paths = layer.paths.unwrap_or_default().finalize();
	let storage = layer.storage.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	validate_config(&auth, &storage)?;

	info!(
		host = %http.host,
		port = http.port,
		base_url = %http.base_url,
		database = %database.url,
		data_dir = %paths.data_dir,
		max_upload_bytes = storage.max_upload_bytes,
		dev_mode = auth.dev_mode,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		database,
		auth,
		paths,
		storage,
		logging,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(auth: &AuthConfig, storage: &StorageConfig) -> Result<(), ConfigError> {
	if auth.dev_mode && auth.is_production() {
		return Err(ConfigError::Validation(
			"VAULT_SERVER_AUTH_DEV_MODE=1 is set while VAULT_SERVER_ENV=production. \
			 This is a security risk. Remove VAULT_SERVER_AUTH_DEV_MODE or set VAULT_SERVER_ENV \
			 to a non-production value."
				.to_string(),
		));
	}

	if storage.max_upload_bytes == 0 {
		return Err(ConfigError::Validation(
			"storage.max_upload_bytes must be greater than zero".to_string(),
		));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_dev_mode_production_validation() {
		let auth = AuthConfig {
			dev_mode: true,
			environment: "production".to_string(),
		};
		let result = validate_config(&auth, &StorageConfig::default());
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("security risk"));
	}

	#[test]
	fn test_dev_mode_development_ok() {
		let auth = AuthConfig {
			dev_mode: true,
			environment: "development".to_string(),
		};
		assert!(validate_config(&auth, &StorageConfig::default()).is_ok());
	}

	#[test]
	fn test_zero_upload_limit_rejected() {
		let storage = StorageConfig {
			max_upload_bytes: 0,
		};
		assert!(validate_config(&AuthConfig::default(), &storage).is_err());
	}

	#[test]
	fn test_socket_addr() {
		let config = ServerConfig {
			http: HttpConfigLayer {
				host: Some("127.0.0.1".to_string()),
				port: Some(9000),
				..Default::default()
			}
			.finalize(),
			..Default::default()
		};
		assert_eq!(config.socket_addr(), "127.0.0.1:9000");
	}

	#[test]
	fn test_file_overrides_defaults() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[database]
url = "sqlite:/var/lib/vault/vault.db"

[storage]
max_upload_bytes = 1048576
"#
		)
		.unwrap();

		let sources: Vec<Box<dyn ConfigSource>> = vec![
			Box::new(TomlSource::new(file.path())),
			Box::new(DefaultsSource),
		];
		let config = load_from_sources(sources).unwrap();

		assert_eq!(config.database.url, "sqlite:/var/lib/vault/vault.db");
		assert_eq!(config.storage.max_upload_bytes, 1_048_576);
		assert_eq!(config.http.port, 8080);
	}
}
