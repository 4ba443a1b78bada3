// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication configuration.

use serde::Deserialize;

pub const PRODUCTION_ENVIRONMENT: &str = "production";

/// Authentication configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct AuthConfig {
	/// Let requests without a bearer token act as the local dev user.
	pub dev_mode: bool,
	pub environment: String,
}

impl Default for AuthConfig {
	fn default() -> Self {
		Self {
			dev_mode: false,
			environment: "development".to_string(),
		}
	}
}

impl AuthConfig {
	pub fn is_production(&self) -> bool {
		self.environment.eq_ignore_ascii_case(PRODUCTION_ENVIRONMENT)
	}
}

/// Authentication configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub dev_mode: Option<bool>,
	#[serde(default)]
	pub environment: Option<String>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.dev_mode.is_some() {
			self.dev_mode = other.dev_mode;
		}
		if other.environment.is_some() {
			self.environment = other.environment;
		}
	}

	pub fn finalize(self) -> AuthConfig {
		let defaults = AuthConfig::default();
		AuthConfig {
			dev_mode: self.dev_mode.unwrap_or(defaults.dev_mode),
			environment: self.environment.unwrap_or(defaults.environment),
		}
	}
}
