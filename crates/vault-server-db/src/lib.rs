// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! # vault-server-db
//!
//! Persistence layer for the Vault document server using SQLite via sqlx.
//!
//! ## Repository Pattern
//!
//! Each domain has a `*Store` trait (the interface handlers depend on) and a
//! `*Repository` struct holding a `SqlitePool` that implements it by delegating
//! to inherent methods.
//!
//! ## Audit Columns
//!
//! Every table carries `created_by`, `updated_by`, `created_at`, `updated_at`.
//! Repositories own an [`AuditStamper`](vault_server_audit::AuditStamper) and
//! call it inside the write transaction, passing the actor explicitly:
//!
//! ```rust,ignore
//! let mut tx = self.pool.begin().await?;
//! self.stamper.on_first_persist(&mut entity, actor)?; // drops tx on failure
//! sqlx::query("INSERT ...").execute(&mut *tx).await?;
//! tx.commit().await?;
//! ```
//!
//! Timestamps are stored as RFC3339 TEXT with microsecond precision.
//!
//! ## Error Handling
//!
//! | Variant | When to use |
//! |---------|-------------|
//! | `NotFound` | Resource must exist but doesn't (update by ID) |
//! | `Conflict` | Unique constraint violation (duplicate email or document name) |
//! | `Sqlx` | Unexpected database errors, propagated via `?` |
//! | `Internal` | Invalid stored data (e.g., unparseable UUID or role) |
//! | `Audit` | No actor for a write, or a stamp out of lifecycle order |
//!
//! Lookups where absence is normal return `Result<Option<T>>`; paginated lists
//! return `Result<(Vec<T>, i64)>` with the total row count.

pub mod document;
mod error;
pub mod migrations;
pub mod pool;
mod timestamps;
pub mod user;

#[cfg(test)]
pub mod testing;

pub use document::{Document, DocumentDetails, DocumentRepository, DocumentStore, NewDocument};
pub use error::{DbError, Result};
pub use migrations::run_migrations;
pub use pool::create_pool;
pub use user::{NewUser, UserRecord, UserRepository, UserStore, DEV_USER_EMAIL};
