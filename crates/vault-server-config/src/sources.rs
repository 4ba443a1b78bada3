// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	AuthConfigLayer, DatabaseConfigLayer, HttpConfigLayer, LoggingConfigLayer, PathsConfigLayer,
	StorageConfigLayer,
};

/// Default location of the server config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/vault/server.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file is not an error.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new(SYSTEM_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: `VAULT_SERVER_<FIELD>`.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		layer_from_lookup(&|name: &str| std::env::var(name).ok())
	}
}

type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Build a layer from an arbitrary variable lookup.
pub(crate) fn layer_from_lookup(lookup: Lookup<'_>) -> Result<ServerConfigLayer, ConfigError> {
	let env = Env { lookup };
	Ok(ServerConfigLayer {
		http: Some(HttpConfigLayer {
			host: env.var("VAULT_SERVER_HOST"),
			port: env.parse("VAULT_SERVER_PORT", "u16")?,
			base_url: env.var("VAULT_SERVER_BASE_URL"),
			cors_origins: env.list("VAULT_SERVER_CORS_ORIGINS"),
		}),
		database: Some(DatabaseConfigLayer {
			url: env.var("VAULT_SERVER_DATABASE_URL"),
			max_connections: env.parse("VAULT_SERVER_DATABASE_MAX_CONNECTIONS", "u32")?,
		}),
		auth: Some(AuthConfigLayer {
			dev_mode: env.bool("VAULT_SERVER_AUTH_DEV_MODE"),
			environment: env.var("VAULT_SERVER_ENV"),
		}),
		paths: Some(PathsConfigLayer {
			data_dir: env.var("VAULT_SERVER_DATA_DIR"),
		}),
		storage: Some(StorageConfigLayer {
			max_upload_bytes: env.parse("VAULT_SERVER_MAX_UPLOAD_BYTES", "u64")?,
		}),
		logging: Some(LoggingConfigLayer {
			level: env.var("VAULT_SERVER_LOG_LEVEL"),
			json: env.bool("VAULT_SERVER_LOG_JSON"),
		}),
	})
}

struct Env<'a> {
	lookup: Lookup<'a>,
}

impl Env<'_> {
	fn var(&self, name: &str) -> Option<String> {
		(self.lookup)(name).filter(|s| !s.is_empty())
	}

	fn bool(&self, name: &str) -> Option<bool> {
		self
			.var(name)
			.map(|v| v.eq_ignore_ascii_case("true") || v == "1")
	}

	fn list(&self, name: &str) -> Option<Vec<String>> {
		self.var(name).map(|s| {
			s.split(',')
				.map(|s| s.trim().to_string())
				.filter(|s| !s.is_empty())
				.collect()
		})
	}

	fn parse<T: std::str::FromStr>(
		&self,
		name: &str,
		type_name: &str,
	) -> Result<Option<T>, ConfigError> {
		match self.var(name) {
			Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
				key: name.to_string(),
				message: format!("invalid {type_name} value '{v}'"),
			}),
			None => Ok(None),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	fn layer_from(vars: &[(&str, &str)]) -> Result<ServerConfigLayer, ConfigError> {
		let map: HashMap<String, String> = vars
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		layer_from_lookup(&move |name: &str| map.get(name).cloned())
	}

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Environment > Precedence::ConfigFile);
		assert!(Precedence::ConfigFile > Precedence::Defaults);
	}

	#[test]
	fn test_defaults_source_returns_empty_layer() {
		let layer = DefaultsSource.load().unwrap();
		assert!(layer.http.is_none());
		assert!(layer.database.is_none());
	}

	#[test]
	fn test_toml_source_missing_file_returns_empty() {
		let layer = TomlSource::new("/nonexistent/vault.toml").load().unwrap();
		assert!(layer.http.is_none());
	}

	#[test]
	fn test_toml_source_reports_parse_errors() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("server.toml");
		std::fs::write(&path, "[http\nport = 1").unwrap();

		let err = TomlSource::new(&path).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
	}

	#[test]
	fn test_env_reads_vault_variables() {
		let layer = layer_from(&[
			("VAULT_SERVER_PORT", "9001"),
			("VAULT_SERVER_AUTH_DEV_MODE", "1"),
			("VAULT_SERVER_CORS_ORIGINS", "https://a.example.com, https://b.example.com"),
			("VAULT_SERVER_LOG_JSON", "true"),
		])
		.unwrap();

		let http = layer.http.unwrap();
		assert_eq!(http.port, Some(9001));
		assert_eq!(http.cors_origins.unwrap().len(), 2);
		assert_eq!(layer.auth.unwrap().dev_mode, Some(true));
		assert_eq!(layer.logging.unwrap().json, Some(true));
	}

	#[test]
	fn test_env_empty_values_are_unset() {
		let layer = layer_from(&[("VAULT_SERVER_HOST", "")]).unwrap();
		assert!(layer.http.unwrap().host.is_none());
	}

	#[test]
	fn test_env_invalid_number_is_rejected() {
		let err = layer_from(&[("VAULT_SERVER_PORT", "eighty")]).unwrap_err();
		match err {
			ConfigError::InvalidValue { key, .. } => assert_eq!(key, "VAULT_SERVER_PORT"),
			other => panic!("unexpected error: {other}"),
		}
	}
}
