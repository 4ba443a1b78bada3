// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User accounts and account-status checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Permission, Role, UserId};

/// Why an otherwise identified account may not authenticate.
///
/// Messages are shown to the caller verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CredentialFailure {
	#[error("User account is currently disabled")]
	AccountDisabled,

	#[error("User account is currently locked")]
	AccountLocked,

	#[error("Incorrect email/password or token")]
	BadCredentials,

	#[error("User credentials have expired. Please reset your password")]
	CredentialsExpired,
}

/// An authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	pub id: UserId,
	/// External identifier (UUID string).
	pub user_id: String,
	pub first_name: String,
	pub last_name: String,
	pub email: String,
	pub phone: Option<String>,
	pub role: Role,
	pub enabled: bool,
	pub account_non_locked: bool,
	pub credentials_non_expired: bool,
	pub last_login: Option<DateTime<Utc>>,
}

impl User {
	pub fn full_name(&self) -> String {
		format!("{} {}", self.first_name, self.last_name)
			.trim()
			.to_string()
	}

	pub fn has_permission(&self, permission: Permission) -> bool {
		self.role.has_permission(permission)
	}

	/// Check the account flags in the order they are reported to callers.
	pub fn check_account_status(&self) -> Result<(), CredentialFailure> {
		if !self.account_non_locked {
			return Err(CredentialFailure::AccountLocked);
		}
		if !self.enabled {
			return Err(CredentialFailure::AccountDisabled);
		}
		if !self.credentials_non_expired {
			return Err(CredentialFailure::CredentialsExpired);
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn make_user() -> User {
		User {
			id: UserId::new(1),
			user_id: "b7a0c9a4-6f1e-4a55-9d5e-0f2d2f1c1a11".to_string(),
			first_name: "Ada".to_string(),
			last_name: "Lovelace".to_string(),
			email: "ada@example.com".to_string(),
			phone: None,
			role: Role::User,
			enabled: true,
			account_non_locked: true,
			credentials_non_expired: true,
			last_login: None,
		}
	}

	#[test]
	fn active_account_passes_status_check() {
		assert!(make_user().check_account_status().is_ok());
	}

	#[test]
	fn locked_is_reported_before_disabled() {
		let user = User {
			enabled: false,
			account_non_locked: false,
			..make_user()
		};
		assert_eq!(
			user.check_account_status(),
			Err(CredentialFailure::AccountLocked)
		);
	}

	#[test]
	fn expired_credentials_are_reported() {
		let user = User {
			credentials_non_expired: false,
			..make_user()
		};
		assert_eq!(
			user.check_account_status(),
			Err(CredentialFailure::CredentialsExpired)
		);
	}

	#[test]
	fn full_name_joins_first_and_last() {
		assert_eq!(make_user().full_name(), "Ada Lovelace");
	}
}
