// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use std::sync::Mutex;

/// Source of the instants written into audit columns.
pub trait Clock: Send + Sync {
	fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> DateTime<Utc> {
		Utc::now()
	}
}

/// A clock that returns a settable instant. Used by tests.
#[derive(Debug)]
pub struct FixedClock {
	instant: Mutex<DateTime<Utc>>,
}

impl FixedClock {
	pub fn new(instant: DateTime<Utc>) -> Self {
		Self {
			instant: Mutex::new(instant),
		}
	}

	pub fn set(&self, instant: DateTime<Utc>) {
		*self.instant.lock().unwrap_or_else(|e| e.into_inner()) = instant;
	}

	pub fn advance(&self, by: chrono::Duration) {
		let mut guard = self.instant.lock().unwrap_or_else(|e| e.into_inner());
		*guard += by;
	}
}

impl Clock for FixedClock {
	fn now(&self) -> DateTime<Utc> {
		*self.instant.lock().unwrap_or_else(|e| e.into_inner())
	}
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
	fn now(&self) -> DateTime<Utc> {
		(**self).now()
	}
}
