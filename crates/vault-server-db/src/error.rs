// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use vault_server_audit::AuditError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Internal: {0}")]
	Internal(String),

	#[error(transparent)]
	Audit(#[from] AuditError),
}

impl DbError {
	/// Map a unique-constraint violation to [`DbError::Conflict`].
	pub(crate) fn from_write(err: sqlx::Error, conflict: impl FnOnce() -> String) -> Self {
		if let sqlx::Error::Database(db_err) = &err {
			if db_err.is_unique_violation() {
				return DbError::Conflict(conflict());
			}
		}
		DbError::Sqlx(err)
	}
}

pub type Result<T> = std::result::Result<T, DbError>;
