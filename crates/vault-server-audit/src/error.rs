// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

use crate::stamp::PersistOperation;

pub type AuditResult<T> = Result<T, AuditError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
	/// No actor could be resolved for the current request.
	#[error("Cannot {} entity without user ID", .operation.verb())]
	MissingActor { operation: PersistOperation },

	#[error("entity {reference_id} has already been created")]
	AlreadyCreated { reference_id: String },

	#[error("entity {reference_id} has not been created yet")]
	NotYetCreated { reference_id: String },
}

impl AuditError {
	pub fn is_missing_actor(&self) -> bool {
		matches!(self, AuditError::MissingActor { .. })
	}
}
