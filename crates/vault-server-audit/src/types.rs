// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity types shared by every auditable entity.
//!
//! - [`ActorId`]: numeric identity of whoever creates or updates a row
//! - [`ReferenceId`]: opaque, externally visible token standing in for a row's
//!   internal numeric key

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identity of the actor (usually an authenticated user) attributed as the
/// creator or updater of a persisted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(i64);

impl ActorId {
	/// Actor used for bootstrap writes issued by the server itself.
	pub const SYSTEM: ActorId = ActorId(0);

	pub fn new(id: i64) -> Self {
		Self(id)
	}

	pub fn into_inner(self) -> i64 {
		self.0
	}
}

impl fmt::Display for ActorId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<i64> for ActorId {
	fn from(id: i64) -> Self {
		Self(id)
	}
}

impl From<ActorId> for i64 {
	fn from(id: ActorId) -> Self {
		id.0
	}
}

/// Externally exposed identifier of a persisted entity.
///
/// Generated once, when the in-memory entity is constructed, and never
/// reassigned. It is unrelated to the database sequence value and is the only
/// identity that crosses the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceId(Uuid);

impl ReferenceId {
	/// Generate a fresh random (v4) reference id.
	pub fn generate() -> Self {
		Self(Uuid::new_v4())
	}

	pub fn new(id: Uuid) -> Self {
		Self(id)
	}

	pub fn as_uuid(&self) -> &Uuid {
		&self.0
	}
}

impl Default for ReferenceId {
	fn default() -> Self {
		Self::generate()
	}
}

impl fmt::Display for ReferenceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for ReferenceId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Uuid::parse_str(s).map(Self)
	}
}
