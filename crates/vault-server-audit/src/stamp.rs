// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Provenance stamping for persisted entities.
//!
//! Any entity that carries [`AuditFields`] and implements [`Auditable`] can be
//! stamped. Repositories call [`AuditStamper::on_first_persist`] right before the
//! INSERT and [`AuditStamper::on_update`] right before every UPDATE, inside the
//! same transaction as the write.
//!
//! # Lifecycle
//!
//! ```text
//! Unstamped ──on_first_persist──▶ Created ──on_update──▶ Created (updater re-stamped)
//! ```
//!
//! There is no transition back to `Unstamped`.
//!
//! # Invariants
//!
//! - `created_by` / `created_at` are written exactly once.
//! - `updated_by` / `updated_at` are written on every persistence, including the first.
//! - A missing actor fails the call before any field is touched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::error::{AuditError, AuditResult};
use crate::types::{ActorId, ReferenceId};

/// Which persistence hook is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistOperation {
	Create,
	Update,
}

impl PersistOperation {
	pub(crate) fn verb(&self) -> &'static str {
		match self {
			PersistOperation::Create => "persist",
			PersistOperation::Update => "update",
		}
	}
}

/// Resolves the actor for the current execution context.
///
/// Implemented by the request auth context; plain ids implement it too so tests
/// can inject any identity.
pub trait ActorSource {
	fn current_actor_id(&self) -> Option<ActorId>;
}

impl ActorSource for ActorId {
	fn current_actor_id(&self) -> Option<ActorId> {
		Some(*self)
	}
}

impl ActorSource for Option<ActorId> {
	fn current_actor_id(&self) -> Option<ActorId> {
		*self
	}
}

impl<T: ActorSource + ?Sized> ActorSource for &T {
	fn current_actor_id(&self) -> Option<ActorId> {
		(**self).current_actor_id()
	}
}

/// Stamp state of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampState {
	Unstamped,
	Created,
}

/// The four provenance columns shared by every persisted entity.
///
/// Fields are private so that only the stamper (or a row loaded back from the
/// database) can populate them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFields {
	created_by: Option<ActorId>,
	updated_by: Option<ActorId>,
	created_at: Option<DateTime<Utc>>,
	updated_at: Option<DateTime<Utc>>,
}

impl AuditFields {
	/// Fields for an entity that has never been persisted.
	pub fn unstamped() -> Self {
		Self::default()
	}

	/// Rebuild the fields of a row read back from storage.
	pub fn restore(
		created_by: ActorId,
		created_at: DateTime<Utc>,
		updated_by: ActorId,
		updated_at: DateTime<Utc>,
	) -> Self {
		Self {
			created_by: Some(created_by),
			updated_by: Some(updated_by),
			created_at: Some(created_at),
			updated_at: Some(updated_at),
		}
	}

	pub fn state(&self) -> StampState {
		if self.created_by.is_some() {
			StampState::Created
		} else {
			StampState::Unstamped
		}
	}

	pub fn created_by(&self) -> Option<ActorId> {
		self.created_by
	}

	pub fn updated_by(&self) -> Option<ActorId> {
		self.updated_by
	}

	pub fn created_at(&self) -> Option<DateTime<Utc>> {
		self.created_at
	}

	pub fn updated_at(&self) -> Option<DateTime<Utc>> {
		self.updated_at
	}
}

/// Capability of an entity that carries audit columns.
pub trait Auditable {
	fn reference_id(&self) -> ReferenceId;
	fn audit_fields(&self) -> &AuditFields;
	fn audit_fields_mut(&mut self) -> &mut AuditFields;
}

/// Applies creation/update provenance using an injected clock.
#[derive(Debug, Clone, Default)]
pub struct AuditStamper<C = SystemClock> {
	clock: C,
}

impl AuditStamper<SystemClock> {
	pub fn system() -> Self {
		Self { clock: SystemClock }
	}
}

impl<C: Clock> AuditStamper<C> {
	pub fn new(clock: C) -> Self {
		Self { clock }
	}

	pub fn clock(&self) -> &C {
		&self.clock
	}

	/// Pre-insert hook.
	///
	/// # Errors
	/// - [`AuditError::MissingActor`] when `actor` resolves to nothing.
	/// - [`AuditError::AlreadyCreated`] when the entity was stamped before.
	pub fn on_first_persist<E, A>(&self, entity: &mut E, actor: &A) -> AuditResult<()>
	where
		E: Auditable + ?Sized,
		A: ActorSource + ?Sized,
	{
		let actor = actor
			.current_actor_id()
			.ok_or(AuditError::MissingActor {
				operation: PersistOperation::Create,
			})?;

		if entity.audit_fields().state() == StampState::Created {
			return Err(AuditError::AlreadyCreated {
				reference_id: entity.reference_id().to_string(),
			});
		}

		let now = self.clock.now();
		let fields = entity.audit_fields_mut();
		fields.created_by = Some(actor);
		fields.created_at = Some(now);
		fields.updated_by = Some(actor);
		fields.updated_at = Some(now);

		tracing::debug!(
			reference_id = %entity.reference_id(),
			actor_id = %actor,
			"stamped entity for first persist"
		);
		Ok(())
	}

	/// Pre-update hook. Leaves creator fields untouched.
	///
	/// # Errors
	/// - [`AuditError::MissingActor`] when `actor` resolves to nothing.
	/// - [`AuditError::NotYetCreated`] when the entity was never persisted.
	pub fn on_update<E, A>(&self, entity: &mut E, actor: &A) -> AuditResult<()>
	where
		E: Auditable + ?Sized,
		A: ActorSource + ?Sized,
	{
		let actor = actor
			.current_actor_id()
			.ok_or(AuditError::MissingActor {
				operation: PersistOperation::Update,
			})?;

		if entity.audit_fields().state() == StampState::Unstamped {
			return Err(AuditError::NotYetCreated {
				reference_id: entity.reference_id().to_string(),
			});
		}

		let now = self.clock.now();
		let fields = entity.audit_fields_mut();
		fields.updated_by = Some(actor);
		fields.updated_at = Some(now);

		tracing::debug!(
			reference_id = %entity.reference_id(),
			actor_id = %actor,
			"stamped entity for update"
		);
		Ok(())
	}
}
