// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server error types and their envelope rendering.
//!
//! Every handler failure becomes a [`ServerError`], which is paired with a
//! status and an [`ApiFailure`] and rendered through the same classifier the
//! direct-write path uses.

use axum::http::StatusCode;
use vault_server_api::{build_error, classify, root_cause_message, ApiFailure, ApiResponse};
use vault_server_auth::AuthRequired;
use vault_server_db::DbError;

use crate::storage::{StorageError, INVALID_FILE_NAME};

pub const DOCUMENT_NOT_FOUND: &str = "Document not found";

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	/// Database error from vault-server-db.
	#[error("Database error: {0}")]
	Db(#[from] DbError),

	/// File storage failed or the file name was refused.
	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),

	/// Requested entity does not exist; the message is shown to the client.
	#[error("{0}")]
	NotFound(String),

	/// Name already taken; the message is shown to the client.
	#[error("{0}")]
	Conflict(String),

	/// Invalid request payload; the message is shown to the client.
	#[error("{0}")]
	BadRequest(String),

	/// Request refused by an extractor, answered with the extractor's own status.
	#[error("{message}")]
	Rejected { status: StatusCode, message: String },

	/// No authenticated user.
	#[error("Unauthorized: {0}")]
	Unauthorized(#[from] AuthRequired),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("Internal error: {0}")]
	Internal(String),
}

impl ServerError {
	pub fn document_not_found() -> Self {
		ServerError::NotFound(DOCUMENT_NOT_FOUND.to_string())
	}

	pub fn duplicate_name(name: &str) -> Self {
		ServerError::Conflict(format!("Document with name {name} already exists"))
	}

	/// The failure and status this error is answered with.
	pub fn into_failure(self) -> (ApiFailure, StatusCode) {
		match self {
			ServerError::Db(DbError::NotFound(msg)) => {
				(ApiFailure::application(msg), StatusCode::NOT_FOUND)
			}
			ServerError::Db(DbError::Conflict(msg)) => {
				(ApiFailure::application(msg), StatusCode::CONFLICT)
			}
			ServerError::Db(DbError::Audit(e)) => {
				tracing::error!(error = %e, "write rejected by audit stamping");
				(ApiFailure::Audit(e), StatusCode::INTERNAL_SERVER_ERROR)
			}
			ServerError::Db(e) => {
				tracing::error!(error = %e, "database error");
				(
					ApiFailure::internal_from("A database error occurred", e),
					StatusCode::INTERNAL_SERVER_ERROR,
				)
			}
			ServerError::Storage(StorageError::InvalidFileName(_)) => (
				ApiFailure::application(INVALID_FILE_NAME),
				StatusCode::BAD_REQUEST,
			),
			ServerError::Storage(e) => {
				tracing::error!(error = %e, "storage error");
				(
					ApiFailure::internal_from("Document storage failed", e),
					StatusCode::INTERNAL_SERVER_ERROR,
				)
			}
			ServerError::NotFound(msg) => (ApiFailure::application(msg), StatusCode::NOT_FOUND),
			ServerError::Conflict(msg) => (ApiFailure::application(msg), StatusCode::CONFLICT),
			ServerError::BadRequest(msg) => {
				(ApiFailure::application(msg), StatusCode::BAD_REQUEST)
			}
			ServerError::Rejected { status, message } => (ApiFailure::application(message), status),
			ServerError::Unauthorized(required) => (
				ApiFailure::Unauthenticated {
					rejection: required.rejection,
				},
				StatusCode::UNAUTHORIZED,
			),
			ServerError::Serialization(e) => {
				tracing::error!(error = %e, "serialization error");
				(
					ApiFailure::internal_from("Failed to serialize response", e),
					StatusCode::INTERNAL_SERVER_ERROR,
				)
			}
			ServerError::Internal(msg) => {
				tracing::error!(error = %msg, "internal error");
				(ApiFailure::internal(msg), StatusCode::INTERNAL_SERVER_ERROR)
			}
		}
	}

	/// Render as an error envelope for `request_path`.
	pub fn into_envelope(self, request_path: &str) -> ApiResponse {
		let (failure, status) = self.into_failure();
		build_error(
			request_path,
			classify(&failure, status),
			root_cause_message(&failure),
			status,
		)
	}
}
