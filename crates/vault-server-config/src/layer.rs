// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration layer for merging from multiple sources.

use serde::Deserialize;

use crate::sections::{
	AuthConfigLayer, DatabaseConfigLayer, HttpConfigLayer, LoggingConfigLayer, PathsConfigLayer,
	StorageConfigLayer,
};

/// Server configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfigLayer {
	#[serde(default)]
	pub http: Option<HttpConfigLayer>,
	#[serde(default)]
	pub database: Option<DatabaseConfigLayer>,
	#[serde(default)]
	pub auth: Option<AuthConfigLayer>,
	#[serde(default)]
	pub paths: Option<PathsConfigLayer>,
	#[serde(default)]
	pub storage: Option<StorageConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl ServerConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: ServerConfigLayer) {
		merge_option(&mut self.http, other.http, HttpConfigLayer::merge);
		merge_option(
			&mut self.database,
			other.database,
			DatabaseConfigLayer::merge,
		);
		merge_option(&mut self.auth, other.auth, AuthConfigLayer::merge);
		merge_option(&mut self.paths, other.paths, PathsConfigLayer::merge);
		merge_option(&mut self.storage, other.storage, StorageConfigLayer::merge);
		merge_option(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_merge_other_overwrites_field_by_field() {
		let mut base = ServerConfigLayer {
			http: Some(HttpConfigLayer {
				port: Some(9000),
				host: Some("127.0.0.1".to_string()),
				..Default::default()
			}),
			..Default::default()
		};
		base.merge(ServerConfigLayer {
			http: Some(HttpConfigLayer {
				port: Some(8080),
				..Default::default()
			}),
			..Default::default()
		});
		let http = base.http.unwrap();
		assert_eq!(http.port, Some(8080));
		assert_eq!(http.host.as_deref(), Some("127.0.0.1"));
	}

	#[test]
	fn test_merge_adds_missing_sections() {
		let mut base = ServerConfigLayer::default();
		base.merge(ServerConfigLayer {
			storage: Some(StorageConfigLayer {
				max_upload_bytes: Some(1024),
			}),
			..Default::default()
		});
		assert_eq!(base.storage.unwrap().max_upload_bytes, Some(1024));
		assert!(base.http.is_none());
	}

	#[test]
	fn test_deserialize_from_toml() {
		let layer: ServerConfigLayer = toml::from_str(
			r#"
[http]
port = 9443
base_url = "https://vault.example.com"

[paths]
data_dir = "/srv/vault"

[logging]
json = true
"#,
		)
		.unwrap();
		assert_eq!(layer.http.unwrap().port, Some(9443));
		assert_eq!(layer.paths.unwrap().data_dir.as_deref(), Some("/srv/vault"));
		assert_eq!(layer.logging.unwrap().json, Some(true));
		assert!(layer.database.is_none());
	}
}
