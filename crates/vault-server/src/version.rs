// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Build information and version utilities for vault-server.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Format version info for display.
pub fn format_version_info() -> String {
	format!(
		"vault-server version: {}\n\
         Platform:             {}-{}",
		VERSION,
		std::env::consts::OS,
		std::env::consts::ARCH,
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn version_info_names_the_package_version() {
		let info = format_version_info();
		assert!(info.starts_with("vault-server version: "));
		assert!(info.contains(VERSION));
		assert!(info.contains(std::env::consts::OS));
	}
}
