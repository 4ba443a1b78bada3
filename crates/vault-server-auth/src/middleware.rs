// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request authentication state.
//!
//! This module provides:
//! - [`CurrentUser`] - authenticated user extracted from a bearer token
//! - [`AuthContext`] - auth state carried through the request pipeline
//! - [`AuthConfig`] - configuration for authentication behavior
//! - [`extract_bearer_token`] - `Authorization` header parsing
//!
//! # Authentication Flow
//!
//! ```text
//! Request → Bearer token → SHA-256 → user lookup → account checks → AuthContext
//! ```
//!
//! Token values are never logged.

use http::header::AUTHORIZATION;
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use vault_server_audit::{ActorId, ActorSource};

use crate::types::{Permission, UserId};
use crate::user::{CredentialFailure, User};

/// The currently authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
	pub user: User,
	/// Set when the request was let through by dev mode without a token.
	pub dev_mode: bool,
}

impl CurrentUser {
	pub fn from_access_token(user: User) -> Self {
		Self {
			user,
			dev_mode: false,
		}
	}

	pub fn from_dev_mode(user: User) -> Self {
		Self {
			user,
			dev_mode: true,
		}
	}

	pub fn user_id(&self) -> UserId {
		self.user.id
	}

	/// Audit actor for writes made on behalf of this user.
	pub fn actor_id(&self) -> ActorId {
		self.user.id.actor_id()
	}

	pub fn has_permission(&self, permission: Permission) -> bool {
		self.user.has_permission(permission)
	}
}

/// Authentication context for request processing.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
	pub current_user: Option<CurrentUser>,
	/// Why a presented token did not authenticate, if it didn't.
	pub rejection: Option<CredentialFailure>,
}

impl AuthContext {
	pub fn unauthenticated() -> Self {
		Self::default()
	}

	/// A context for a request whose credentials were presented but refused.
	pub fn rejected(reason: CredentialFailure) -> Self {
		Self {
			current_user: None,
			rejection: Some(reason),
		}
	}

	pub fn authenticated(current_user: CurrentUser) -> Self {
		Self {
			current_user: Some(current_user),
			rejection: None,
		}
	}

	pub fn is_authenticated(&self) -> bool {
		self.current_user.is_some()
	}

	pub fn user(&self) -> Option<&CurrentUser> {
		self.current_user.as_ref()
	}

	pub fn require_user(&self) -> Result<&CurrentUser, AuthRequired> {
		self.current_user.as_ref().ok_or(AuthRequired {
			rejection: self.rejection,
		})
	}

	pub fn actor_id(&self) -> Option<ActorId> {
		self.current_user.as_ref().map(CurrentUser::actor_id)
	}
}

impl ActorSource for AuthContext {
	fn current_actor_id(&self) -> Option<ActorId> {
		self.actor_id()
	}
}

impl ActorSource for CurrentUser {
	fn current_actor_id(&self) -> Option<ActorId> {
		Some(self.actor_id())
	}
}

/// Error returned when authentication is required but not present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthRequired {
	pub rejection: Option<CredentialFailure>,
}

impl std::fmt::Display for AuthRequired {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self.rejection {
			Some(reason) => write!(f, "authentication required: {reason}"),
			None => write!(f, "authentication required"),
		}
	}
}

impl std::error::Error for AuthRequired {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		self
			.rejection
			.as_ref()
			.map(|r| r as &(dyn std::error::Error + 'static))
	}
}

/// Configuration for authentication middleware.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
	/// Let token-less requests through as the local dev user.
	pub dev_mode: bool,
}

impl AuthConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_dev_mode(mut self, enabled: bool) -> Self {
		self.dev_mode = enabled;
		self
	}
}

/// Extract bearer token from the Authorization header.
///
/// Expects the format: `Authorization: Bearer <token>`. Returns `None` when the
/// header is missing, malformed, or carries an empty token.
#[instrument(level = "trace", skip_all)]
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
	let auth_header = headers.get(AUTHORIZATION)?;
	let auth_str = auth_header.to_str().ok()?;
	auth_str
		.strip_prefix("Bearer ")
		.map(str::trim)
		.filter(|token| !token.is_empty())
		.map(|token| token.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::Role;
	use http::header::HeaderValue;

	fn make_test_user(id: i64) -> User {
		User {
			id: UserId::new(id),
			user_id: "3f0e6a5e-1c1b-4a4c-9a43-7d3f8a2e9f10".to_string(),
			first_name: "Test".to_string(),
			last_name: "User".to_string(),
			email: "test@example.com".to_string(),
			phone: None,
			role: Role::User,
			enabled: true,
			account_non_locked: true,
			credentials_non_expired: true,
			last_login: None,
		}
	}

	mod auth_context {
		use super::*;

		#[test]
		fn unauthenticated_has_no_actor() {
			let ctx = AuthContext::unauthenticated();
			assert!(!ctx.is_authenticated());
			assert_eq!(ctx.current_actor_id(), None);
			assert!(ctx.require_user().is_err());
		}

		#[test]
		fn authenticated_resolves_actor_from_user() {
			let ctx = AuthContext::authenticated(CurrentUser::from_access_token(make_test_user(7)));
			assert!(ctx.is_authenticated());
			assert_eq!(ctx.current_actor_id(), Some(ActorId::new(7)));
			assert_eq!(ctx.require_user().unwrap().user_id(), UserId::new(7));
		}

		#[test]
		fn rejection_is_reported_by_require_user() {
			let ctx = AuthContext::rejected(CredentialFailure::AccountLocked);
			let err = ctx.require_user().unwrap_err();
			assert_eq!(err.rejection, Some(CredentialFailure::AccountLocked));
			assert!(err.to_string().contains("locked"));
		}
	}

	mod bearer_token {
		use super::*;

		#[test]
		fn extracts_token() {
			let mut headers = HeaderMap::new();
			headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer vt_abc123"));
			assert_eq!(extract_bearer_token(&headers), Some("vt_abc123".to_string()));
		}

		#[test]
		fn missing_header_returns_none() {
			assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
		}

		#[test]
		fn wrong_scheme_returns_none() {
			let mut headers = HeaderMap::new();
			headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
			assert_eq!(extract_bearer_token(&headers), None);
		}

		#[test]
		fn empty_token_returns_none() {
			let mut headers = HeaderMap::new();
			headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
			assert_eq!(extract_bearer_token(&headers), None);
		}
	}
}
