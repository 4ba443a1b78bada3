// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Upload limits.

use serde::Deserialize;

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct StorageConfig {
	/// Upper bound on a whole multipart upload request body.
	pub max_upload_bytes: u64,
}

impl Default for StorageConfig {
	fn default() -> Self {
		Self {
			max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfigLayer {
	#[serde(default)]
	pub max_upload_bytes: Option<u64>,
}

impl StorageConfigLayer {
	pub fn merge(&mut self, other: StorageConfigLayer) {
		if other.max_upload_bytes.is_some() {
			self.max_upload_bytes = other.max_upload_bytes;
		}
	}

	pub fn finalize(self) -> StorageConfig {
		StorageConfig {
			max_upload_bytes: self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_is_fifty_mebibytes() {
		assert_eq!(
			StorageConfigLayer::default().finalize().max_upload_bytes,
			52_428_800
		);
	}
}
