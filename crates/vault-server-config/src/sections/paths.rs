// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server paths configuration section.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_data_dir() -> String {
	"./data".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PathsConfigLayer {
	pub data_dir: Option<String>,
}

impl PathsConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.data_dir.is_some() {
			self.data_dir = other.data_dir;
		}
	}

	pub fn finalize(self) -> PathsConfig {
		PathsConfig {
			data_dir: self.data_dir.unwrap_or_else(default_data_dir),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathsConfig {
	pub data_dir: String,
}

impl PathsConfig {
	/// Directory holding uploaded document bytes.
	pub fn documents_dir(&self) -> PathBuf {
		PathBuf::from(&self.data_dir).join("documents")
	}
}

impl Default for PathsConfig {
	fn default() -> Self {
		Self {
			data_dir: default_data_dir(),
		}
	}
}
