// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit provenance for Vault entities.
//!
//! Every persisted row records who created it, who last updated it, and when.
//! This crate owns that convention: the identity types, the [`Auditable`]
//! capability, and the [`AuditStamper`] that repositories call from their write
//! paths.

pub mod clock;
pub mod error;
pub mod stamp;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{AuditError, AuditResult};
pub use stamp::{ActorSource, AuditFields, AuditStamper, Auditable, PersistOperation, StampState};
pub use types::{ActorId, ReferenceId};
