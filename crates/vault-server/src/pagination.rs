// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared pagination utilities for API handlers.

use utoipa::IntoParams;

pub const DEFAULT_PAGE_SIZE: i64 = 5;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Query parameters for paged listings.
#[derive(Debug, Clone, Default, serde::Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
	/// Zero-based page number (default: 0).
	pub page: Option<i64>,
	/// Page size, clamped to 1..=100 (default: 5).
	pub size: Option<i64>,
}

impl PageParams {
	pub fn page_or_default(&self) -> u32 {
		self.page.unwrap_or(0).clamp(0, i64::from(u32::MAX)) as u32
	}

	pub fn size_clamped(&self) -> u32 {
		self.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE) as u32
	}
}

/// Query parameters for the name search.
#[derive(Debug, Clone, Default, serde::Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
	pub page: Option<i64>,
	pub size: Option<i64>,
	/// Substring of the document name; blank means no filter.
	pub name: Option<String>,
}

impl SearchParams {
	pub fn paging(&self) -> PageParams {
		PageParams {
			page: self.page,
			size: self.size,
		}
	}

	/// The name filter, or `None` when it is missing or blank.
	pub fn name_filter(&self) -> Option<&str> {
		self.name
			.as_deref()
			.map(str::trim)
			.filter(|name| !name.is_empty())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_page_defaults() {
		let params = PageParams::default();
		assert_eq!(params.page_or_default(), 0);
		assert_eq!(params.size_clamped(), 5);
	}

	#[test]
	fn test_page_clamping() {
		let params = PageParams {
			page: Some(-3),
			size: Some(500),
		};
		assert_eq!(params.page_or_default(), 0);
		assert_eq!(params.size_clamped(), 100);

		let params = PageParams {
			page: Some(2),
			size: Some(0),
		};
		assert_eq!(params.page_or_default(), 2);
		assert_eq!(params.size_clamped(), 1);
	}

	#[test]
	fn test_blank_name_is_no_filter() {
		let params = SearchParams {
			name: Some("   ".to_string()),
			..Default::default()
		};
		assert_eq!(params.name_filter(), None);

		let params = SearchParams {
			page: Some(1),
			size: Some(10),
			name: Some(" report ".to_string()),
		};
		assert_eq!(params.name_filter(), Some("report"));
		assert_eq!(params.paging().page_or_default(), 1);
		assert_eq!(params.paging().size_clamped(), 10);
	}

	proptest! {
		#[test]
		fn prop_size_always_in_bounds(size in any::<i64>()) {
			let params = PageParams { page: None, size: Some(size) };
			let clamped = params.size_clamped();
			prop_assert!((1..=100).contains(&clamped));
		}
	}
}
