// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Failure taxonomy and the status-to-reason classifier.
//!
//! [`classify`] picks the user-facing `message`; [`root_cause_message`] fills
//! `exception`. The first match wins:
//!
//! | condition | message |
//! |---|---|
//! | status 403 | `You do not have enough permission` |
//! | status 401 | `You are not logged in` |
//! | credential or application failure | the failure's own message |
//! | status 5xx | `An internal server error occurred` |
//! | anything else | `An error occurred. Please try again.` |

use std::error::Error as StdError;

use http::StatusCode;
use vault_server_audit::AuditError;
use vault_server_auth::CredentialFailure;

pub const PERMISSION_DENIED_MESSAGE: &str = "You do not have enough permission";
pub const NOT_LOGGED_IN_MESSAGE: &str = "You are not logged in";
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred";
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred. Please try again.";

pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Anything that can go wrong while serving a request.
#[derive(Debug, thiserror::Error)]
pub enum ApiFailure {
	/// The caller is authenticated but lacks an authority.
	#[error("Access denied: {0}")]
	AccessDenied(String),

	/// No usable credentials were presented.
	#[error("Full authentication is required to access this resource")]
	Unauthenticated {
		#[source]
		rejection: Option<CredentialFailure>,
	},

	/// Credentials were presented and refused.
	#[error(transparent)]
	Credential(#[from] CredentialFailure),

	/// Domain error whose message is safe to show as-is.
	#[error("{0}")]
	Application(String),

	/// Provenance could not be applied to a write.
	#[error(transparent)]
	Audit(#[from] AuditError),

	/// Unexpected server-side fault.
	#[error("{message}")]
	Internal {
		message: String,
		#[source]
		source: Option<BoxError>,
	},
}

impl ApiFailure {
	pub fn access_denied(detail: impl Into<String>) -> Self {
		ApiFailure::AccessDenied(detail.into())
	}

	pub fn application(message: impl Into<String>) -> Self {
		ApiFailure::Application(message.into())
	}

	pub fn internal(message: impl Into<String>) -> Self {
		ApiFailure::Internal {
			message: message.into(),
			source: None,
		}
	}

	pub fn internal_from<E>(message: impl Into<String>, source: E) -> Self
	where
		E: StdError + Send + Sync + 'static,
	{
		ApiFailure::Internal {
			message: message.into(),
			source: Some(Box::new(source)),
		}
	}

	pub fn is_access_denied(&self) -> bool {
		matches!(self, ApiFailure::AccessDenied(_))
	}

	/// Short type-like label used in the `exception` field.
	pub fn kind(&self) -> &'static str {
		match self {
			ApiFailure::AccessDenied(_) => "AccessDenied",
			ApiFailure::Unauthenticated { .. } => "Unauthenticated",
			ApiFailure::Credential(_) => "CredentialFailure",
			ApiFailure::Application(_) => "ApplicationError",
			ApiFailure::Audit(_) => "AuditError",
			ApiFailure::Internal { .. } => "InternalError",
		}
	}
}

/// Coarse bucket a failure falls into, given the status it is answered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
	MissingActor,
	SecurityRejection,
	CredentialFailure,
	ServerFault,
	GenericFailure,
}

impl ErrorCategory {
	pub fn of(failure: &ApiFailure, status: StatusCode) -> Self {
		match failure {
			ApiFailure::Audit(err) if err.is_missing_actor() => ErrorCategory::MissingActor,
			ApiFailure::AccessDenied(_) | ApiFailure::Unauthenticated { .. } => {
				ErrorCategory::SecurityRejection
			}
			_ if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED => {
				ErrorCategory::SecurityRejection
			}
			ApiFailure::Credential(_) => ErrorCategory::CredentialFailure,
			_ if status.is_server_error() => ErrorCategory::ServerFault,
			_ => ErrorCategory::GenericFailure,
		}
	}
}

/// Pick the display-safe reason for `failure` answered with `status`.
pub fn classify(failure: &ApiFailure, status: StatusCode) -> String {
	if status == StatusCode::FORBIDDEN {
		return PERMISSION_DENIED_MESSAGE.to_string();
	}
	if status == StatusCode::UNAUTHORIZED {
		return NOT_LOGGED_IN_MESSAGE.to_string();
	}
	match failure {
		ApiFailure::Credential(reason) => return reason.to_string(),
		ApiFailure::Application(message) => return message.clone(),
		_ => {}
	}
	if status.is_server_error() {
		INTERNAL_ERROR_MESSAGE.to_string()
	} else {
		GENERIC_ERROR_MESSAGE.to_string()
	}
}

/// Render the deepest cause of `failure` as `"<Kind>: <message>"`.
pub fn root_cause_message(failure: &ApiFailure) -> String {
	let mut current: &(dyn StdError + 'static) = failure;
	while let Some(next) = current.source() {
		current = next;
	}

	let kind = kind_of(current, failure);
	let message = current.to_string();
	if message.is_empty() {
		kind.to_string()
	} else {
		format!("{kind}: {message}")
	}
}

fn kind_of(err: &(dyn StdError + 'static), outer: &ApiFailure) -> &'static str {
	if let Some(failure) = err.downcast_ref::<ApiFailure>() {
		failure.kind()
	} else if err.is::<CredentialFailure>() {
		"CredentialFailure"
	} else if err.is::<AuditError>() {
		"AuditError"
	} else if err.is::<std::io::Error>() {
		"IoError"
	} else if err.is::<serde_json::Error>() {
		"JsonError"
	} else {
		outer.kind()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use vault_server_audit::PersistOperation;

	#[test]
	fn forbidden_wins_over_everything() {
		let failure = ApiFailure::Credential(CredentialFailure::AccountLocked);
		assert_eq!(
			classify(&failure, StatusCode::FORBIDDEN),
			PERMISSION_DENIED_MESSAGE
		);
	}

	#[test]
	fn unauthorized_is_not_logged_in() {
		let failure = ApiFailure::Unauthenticated { rejection: None };
		assert_eq!(
			classify(&failure, StatusCode::UNAUTHORIZED),
			NOT_LOGGED_IN_MESSAGE
		);
	}

	#[test]
	fn credential_failures_pass_their_message_through() {
		let failure = ApiFailure::Credential(CredentialFailure::AccountDisabled);
		assert_eq!(
			classify(&failure, StatusCode::BAD_REQUEST),
			"User account is currently disabled"
		);
	}

	#[test]
	fn application_errors_pass_through_even_on_5xx() {
		let failure = ApiFailure::application("Document not found");
		assert_eq!(
			classify(&failure, StatusCode::INTERNAL_SERVER_ERROR),
			"Document not found"
		);
	}

	#[test]
	fn internal_fault_on_500_is_generic_internal() {
		let failure = ApiFailure::internal("pool closed");
		assert_eq!(
			classify(&failure, StatusCode::INTERNAL_SERVER_ERROR),
			INTERNAL_ERROR_MESSAGE
		);
	}

	#[test]
	fn other_client_errors_get_the_generic_reason() {
		let failure = ApiFailure::internal("odd");
		assert_eq!(
			classify(&failure, StatusCode::BAD_REQUEST),
			GENERIC_ERROR_MESSAGE
		);
	}

	#[test]
	fn missing_actor_is_its_own_category() {
		let failure = ApiFailure::Audit(AuditError::MissingActor {
			operation: PersistOperation::Create,
		});
		assert_eq!(
			ErrorCategory::of(&failure, StatusCode::INTERNAL_SERVER_ERROR),
			ErrorCategory::MissingActor
		);
		assert_eq!(
			classify(&failure, StatusCode::INTERNAL_SERVER_ERROR),
			INTERNAL_ERROR_MESSAGE
		);
		assert_eq!(
			root_cause_message(&failure),
			"AuditError: Cannot persist entity without user ID"
		);
	}

	#[test]
	fn categories_follow_status_and_failure() {
		assert_eq!(
			ErrorCategory::of(&ApiFailure::access_denied("x"), StatusCode::FORBIDDEN),
			ErrorCategory::SecurityRejection
		);
		assert_eq!(
			ErrorCategory::of(
				&ApiFailure::Credential(CredentialFailure::BadCredentials),
				StatusCode::BAD_REQUEST
			),
			ErrorCategory::CredentialFailure
		);
		assert_eq!(
			ErrorCategory::of(&ApiFailure::internal("x"), StatusCode::SERVICE_UNAVAILABLE),
			ErrorCategory::ServerFault
		);
		assert_eq!(
			ErrorCategory::of(&ApiFailure::application("x"), StatusCode::NOT_FOUND),
			ErrorCategory::GenericFailure
		);
	}

	#[test]
	fn root_cause_walks_to_the_deepest_source() {
		let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
		let failure = ApiFailure::internal_from("failed to store upload", io);
		assert_eq!(root_cause_message(&failure), "IoError: disk full");
	}

	#[test]
	fn root_cause_of_unauthenticated_with_rejection_is_the_rejection() {
		let failure = ApiFailure::Unauthenticated {
			rejection: Some(CredentialFailure::CredentialsExpired),
		};
		assert_eq!(
			root_cause_message(&failure),
			"CredentialFailure: User credentials have expired. Please reset your password"
		);
	}

	#[test]
	fn root_cause_of_access_denied_names_the_failure() {
		let failure = ApiFailure::access_denied("missing document:create");
		assert_eq!(
			root_cause_message(&failure),
			"AccessDenied: Access denied: missing document:create"
		);
	}

	proptest! {
		#[test]
		fn prop_classification_is_never_empty(code in 400u16..600, msg in "[a-z ]{0,20}") {
			let status = StatusCode::from_u16(code).unwrap();
			let failure = ApiFailure::internal(msg);
			prop_assert!(!classify(&failure, status).is_empty());
			prop_assert!(!root_cause_message(&failure).is_empty());
		}

		#[test]
		fn prop_forbidden_always_maps_to_permission_message(msg in "[a-zA-Z ]{1,30}") {
			let failure = ApiFailure::application(msg);
			prop_assert_eq!(classify(&failure, StatusCode::FORBIDDEN), PERMISSION_DENIED_MESSAGE);
		}
	}
}
