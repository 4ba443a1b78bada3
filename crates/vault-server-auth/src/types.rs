// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for authentication and authorization.
//!
//! - [`UserId`]: internal numeric key of a user row (never serialized to clients)
//! - [`Role`]: coarse role assigned to each user
//! - [`Permission`]: fine-grained authority checked by route layers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use vault_server_audit::ActorId;

// =============================================================================
// ID Newtypes
// =============================================================================

/// Internal numeric identifier for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
	pub fn new(id: i64) -> Self {
		Self(id)
	}

	pub fn into_inner(self) -> i64 {
		self.0
	}

	/// The audit actor this user acts as.
	pub fn actor_id(self) -> ActorId {
		ActorId::new(self.0)
	}
}

impl fmt::Display for UserId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<i64> for UserId {
	fn from(id: i64) -> Self {
		Self(id)
	}
}

// =============================================================================
// Permissions
// =============================================================================

/// Authorities checked before a request reaches a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
	#[serde(rename = "document:create")]
	DocumentCreate,
	#[serde(rename = "document:read")]
	DocumentRead,
	#[serde(rename = "document:update")]
	DocumentUpdate,
	#[serde(rename = "document:delete")]
	DocumentDelete,
	#[serde(rename = "user:read")]
	UserRead,
	#[serde(rename = "user:update")]
	UserUpdate,
}

impl Permission {
	pub fn as_str(&self) -> &'static str {
		match self {
			Permission::DocumentCreate => "document:create",
			Permission::DocumentRead => "document:read",
			Permission::DocumentUpdate => "document:update",
			Permission::DocumentDelete => "document:delete",
			Permission::UserRead => "user:read",
			Permission::UserUpdate => "user:update",
		}
	}
}

impl fmt::Display for Permission {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

// =============================================================================
// Roles
// =============================================================================

/// Role assigned to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
	/// Read-only access to documents.
	Guest,
	/// Standard account: upload, read and edit documents.
	User,
	Manager,
	Admin,
	SuperAdmin,
}

impl Role {
	pub fn all() -> &'static [Role] {
		&[
			Role::Guest,
			Role::User,
			Role::Manager,
			Role::Admin,
			Role::SuperAdmin,
		]
	}

	/// Authorities granted by this role.
	pub fn permissions(&self) -> &'static [Permission] {
		use Permission::*;
		match self {
			Role::Guest => &[DocumentRead, UserRead],
			Role::User => &[
				DocumentCreate,
				DocumentRead,
				DocumentUpdate,
				UserRead,
				UserUpdate,
			],
			Role::Manager | Role::Admin | Role::SuperAdmin => &[
				DocumentCreate,
				DocumentRead,
				DocumentUpdate,
				DocumentDelete,
				UserRead,
				UserUpdate,
			],
		}
	}

	pub fn has_permission(&self, permission: Permission) -> bool {
		self.permissions().contains(&permission)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Role::Guest => "GUEST",
			Role::User => "USER",
			Role::Manager => "MANAGER",
			Role::Admin => "ADMIN",
			Role::SuperAdmin => "SUPER_ADMIN",
		}
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Role {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_uppercase().as_str() {
			"GUEST" => Ok(Role::Guest),
			"USER" => Ok(Role::User),
			"MANAGER" => Ok(Role::Manager),
			"ADMIN" => Ok(Role::Admin),
			"SUPER_ADMIN" => Ok(Role::SuperAdmin),
			other => Err(format!("unknown role: {other}")),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn guest_is_read_only() {
		assert!(Role::Guest.has_permission(Permission::DocumentRead));
		assert!(!Role::Guest.has_permission(Permission::DocumentCreate));
		assert!(!Role::Guest.has_permission(Permission::DocumentUpdate));
	}

	#[test]
	fn user_can_upload_and_edit_but_not_delete() {
		assert!(Role::User.has_permission(Permission::DocumentCreate));
		assert!(Role::User.has_permission(Permission::DocumentUpdate));
		assert!(!Role::User.has_permission(Permission::DocumentDelete));
	}

	#[test]
	fn role_round_trips_through_its_name() {
		for role in Role::all() {
			assert_eq!(role.as_str().parse::<Role>().unwrap(), *role);
		}
	}

	#[test]
	fn permission_serializes_as_authority_string() {
		let json = serde_json::to_string(&Permission::DocumentCreate).unwrap();
		assert_eq!(json, "\"document:create\"");
	}

	#[test]
	fn user_id_maps_to_actor() {
		assert_eq!(UserId::new(7).actor_id(), ActorId::new(7));
	}
}
