// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User repository.
//!
//! Users authenticate with a bearer token whose SHA-256 hash is stored in
//! `users.token_hash`. Like every persisted row, users carry audit columns
//! stamped by whoever created or last changed them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use std::sync::Arc;
use uuid::Uuid;
use vault_server_audit::{
	ActorId, ActorSource, AuditFields, AuditStamper, Auditable, Clock, ReferenceId, SystemClock,
};
use vault_server_auth::{Role, User, UserId};

use crate::error::DbError;
use crate::timestamps::{format_timestamp, parse_optional_timestamp, parse_timestamp};

/// Email of the account used when dev mode lets token-less requests through.
pub const DEV_USER_EMAIL: &str = "dev@localhost";

/// Fields supplied when creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
	pub first_name: String,
	pub last_name: String,
	pub email: String,
	pub phone: Option<String>,
	pub role: Role,
}

/// A user row with its provenance.
#[derive(Debug, Clone)]
pub struct UserRecord {
	pub user: User,
	reference_id: ReferenceId,
	audit: AuditFields,
}

impl UserRecord {
	/// An unsaved user. `user.id` stays zero until the row is inserted.
	pub fn new(new_user: NewUser) -> Self {
		Self {
			user: User {
				id: UserId::new(0),
				user_id: Uuid::new_v4().to_string(),
				first_name: new_user.first_name,
				last_name: new_user.last_name,
				email: new_user.email,
				phone: new_user.phone,
				role: new_user.role,
				enabled: true,
				account_non_locked: true,
				credentials_non_expired: true,
				last_login: None,
			},
			reference_id: ReferenceId::generate(),
			audit: AuditFields::unstamped(),
		}
	}
}

impl Auditable for UserRecord {
	fn reference_id(&self) -> ReferenceId {
		self.reference_id
	}

	fn audit_fields(&self) -> &AuditFields {
		&self.audit
	}

	fn audit_fields_mut(&mut self) -> &mut AuditFields {
		&mut self.audit
	}
}

#[async_trait]
pub trait UserStore: Send + Sync {
	async fn create_user(
		&self,
		new_user: NewUser,
		token_hash: &str,
		actor: &(dyn ActorSource + Sync),
	) -> Result<UserRecord, DbError>;
	async fn get_user_by_id(&self, id: UserId) -> Result<Option<UserRecord>, DbError>;
	async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, DbError>;
	async fn get_user_by_token_hash(&self, token_hash: &str) -> Result<Option<UserRecord>, DbError>;
	async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> Result<(), DbError>;
	async fn find_or_create_dev_user(&self) -> Result<UserRecord, DbError>;
}

#[async_trait]
impl UserStore for UserRepository {
	async fn create_user(
		&self,
		new_user: NewUser,
		token_hash: &str,
		actor: &(dyn ActorSource + Sync),
	) -> Result<UserRecord, DbError> {
		self.create_user(new_user, token_hash, actor).await
	}

	async fn get_user_by_id(&self, id: UserId) -> Result<Option<UserRecord>, DbError> {
		self.get_user_by_id(id).await
	}

	async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, DbError> {
		self.get_user_by_email(email).await
	}

	async fn get_user_by_token_hash(&self, token_hash: &str) -> Result<Option<UserRecord>, DbError> {
		self.get_user_by_token_hash(token_hash).await
	}

	async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> Result<(), DbError> {
		self.record_login(id, at).await
	}

	async fn find_or_create_dev_user(&self) -> Result<UserRecord, DbError> {
		self.find_or_create_dev_user().await
	}
}

/// Repository for user database operations.
#[derive(Clone)]
pub struct UserRepository {
	pool: SqlitePool,
	stamper: AuditStamper<Arc<dyn Clock>>,
}

const USER_COLUMNS: &str = r#"
	id, reference_id, user_id, first_name, last_name, email, phone, role,
	enabled, account_non_locked, credentials_non_expired, last_login,
	created_by, updated_by, created_at, updated_at
"#;

impl UserRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self::with_clock(pool, Arc::new(SystemClock))
	}

	pub fn with_clock(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
		Self {
			pool,
			stamper: AuditStamper::new(clock),
		}
	}

	/// Insert a user, stamped with `actor` as creator.
	///
	/// # Errors
	/// - `DbError::Audit` when `actor` resolves to nothing; nothing is written.
	/// - `DbError::Conflict` when the email or token hash is taken.
	#[tracing::instrument(skip(self, new_user, token_hash, actor), fields(email = %new_user.email))]
	pub async fn create_user(
		&self,
		new_user: NewUser,
		token_hash: &str,
		actor: &(dyn ActorSource + Sync),
	) -> Result<UserRecord, DbError> {
		let mut record = UserRecord::new(new_user);
		let mut tx = self.pool.begin().await?;

		self.stamper.on_first_persist(&mut record, actor)?;
		let (created_by, created_at, updated_by, updated_at) = audit_columns(&record.audit)?;

		let result = sqlx::query(
			r#"
			INSERT INTO users (
				reference_id, user_id, first_name, last_name, email, phone, role,
				enabled, account_non_locked, credentials_non_expired, token_hash,
				created_by, updated_by, created_at, updated_at
			) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(record.reference_id.to_string())
		.bind(&record.user.user_id)
		.bind(&record.user.first_name)
		.bind(&record.user.last_name)
		.bind(&record.user.email)
		.bind(&record.user.phone)
		.bind(record.user.role.as_str())
		.bind(record.user.enabled)
		.bind(record.user.account_non_locked)
		.bind(record.user.credentials_non_expired)
		.bind(token_hash)
		.bind(created_by)
		.bind(updated_by)
		.bind(created_at)
		.bind(updated_at)
		.execute(&mut *tx)
		.await
		.map_err(|e| {
			DbError::from_write(e, || {
				format!("User with email {} already exists", record.user.email)
			})
		})?;

		tx.commit().await?;

		record.user.id = UserId::new(result.last_insert_rowid());
		tracing::debug!(user_id = %record.user.id, "user created");
		Ok(record)
	}

	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn get_user_by_id(&self, id: UserId) -> Result<Option<UserRecord>, DbError> {
		let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
			.bind(id.into_inner())
			.fetch_optional(&self.pool)
			.await?;

		row.as_ref().map(parse_user_row).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, DbError> {
		let row = sqlx::query(&format!(
			"SELECT {USER_COLUMNS} FROM users WHERE email = ? COLLATE NOCASE"
		))
		.bind(email)
		.fetch_optional(&self.pool)
		.await?;

		row.as_ref().map(parse_user_row).transpose()
	}

	/// Look up the owner of a bearer token by its hash.
	#[tracing::instrument(skip(self, token_hash))]
	pub async fn get_user_by_token_hash(
		&self,
		token_hash: &str,
	) -> Result<Option<UserRecord>, DbError> {
		let row = sqlx::query(&format!(
			"SELECT {USER_COLUMNS} FROM users WHERE token_hash = ?"
		))
		.bind(token_hash)
		.fetch_optional(&self.pool)
		.await?;

		row.as_ref().map(parse_user_row).transpose()
	}

	/// Record a successful authentication. The user is the actor of this write.
	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> Result<(), DbError> {
		let mut tx = self.pool.begin().await?;

		let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
			.bind(id.into_inner())
			.fetch_optional(&mut *tx)
			.await?;
		let mut record = match row {
			Some(row) => parse_user_row(&row)?,
			None => return Err(DbError::NotFound(format!("User {id}"))),
		};

		self.stamper.on_update(&mut record, &id.actor_id())?;
		let (_, _, updated_by, updated_at) = audit_columns(&record.audit)?;

		sqlx::query("UPDATE users SET last_login = ?, updated_by = ?, updated_at = ? WHERE id = ?")
			.bind(format_timestamp(at))
			.bind(updated_by)
			.bind(updated_at)
			.bind(id.into_inner())
			.execute(&mut *tx)
			.await?;

		tx.commit().await?;
		Ok(())
	}

	/// Return the dev-mode account, creating it on first use.
	#[tracing::instrument(skip(self))]
	pub async fn find_or_create_dev_user(&self) -> Result<UserRecord, DbError> {
		if let Some(record) = self.get_user_by_email(DEV_USER_EMAIL).await? {
			return Ok(record);
		}

		let new_user = NewUser {
			first_name: "Dev".to_string(),
			last_name: "User".to_string(),
			email: DEV_USER_EMAIL.to_string(),
			phone: None,
			role: Role::SuperAdmin,
		};
		// Dev user has no usable token; hash a random value so the column stays unique.
		let token_hash = format!("dev-{}", Uuid::new_v4());
		match self
			.create_user(new_user, &token_hash, &ActorId::SYSTEM)
			.await
		{
			Ok(record) => Ok(record),
			Err(DbError::Conflict(_)) => self
				.get_user_by_email(DEV_USER_EMAIL)
				.await?
				.ok_or_else(|| DbError::Internal("dev user vanished after conflict".to_string())),
			Err(e) => Err(e),
		}
	}
}

/// Audit columns in storage form. Fails if the record was never stamped.
pub(crate) fn audit_columns(audit: &AuditFields) -> Result<(i64, String, i64, String), DbError> {
	match (
		audit.created_by(),
		audit.created_at(),
		audit.updated_by(),
		audit.updated_at(),
	) {
		(Some(created_by), Some(created_at), Some(updated_by), Some(updated_at)) => Ok((
			created_by.into_inner(),
			format_timestamp(created_at),
			updated_by.into_inner(),
			format_timestamp(updated_at),
		)),
		_ => Err(DbError::Internal(
			"audit columns missing after stamping".to_string(),
		)),
	}
}

/// Rebuild audit fields from the standard four columns of `row`.
pub(crate) fn restore_audit(row: &SqliteRow) -> Result<AuditFields, DbError> {
	let created_by: i64 = row.try_get("created_by")?;
	let updated_by: i64 = row.try_get("updated_by")?;
	let created_at: String = row.try_get("created_at")?;
	let updated_at: String = row.try_get("updated_at")?;

	Ok(AuditFields::restore(
		ActorId::new(created_by),
		parse_timestamp(&created_at, "created_at")?,
		ActorId::new(updated_by),
		parse_timestamp(&updated_at, "updated_at")?,
	))
}

fn parse_user_row(row: &SqliteRow) -> Result<UserRecord, DbError> {
	let reference_id: String = row.try_get("reference_id")?;
	let role: String = row.try_get("role")?;
	let last_login: Option<String> = row.try_get("last_login")?;

	let user = User {
		id: UserId::new(row.try_get("id")?),
		user_id: row.try_get("user_id")?,
		first_name: row.try_get("first_name")?,
		last_name: row.try_get("last_name")?,
		email: row.try_get("email")?,
		phone: row.try_get("phone")?,
		role: role
			.parse::<Role>()
			.map_err(|e| DbError::Internal(format!("Invalid role: {e}")))?,
		enabled: row.try_get("enabled")?,
		account_non_locked: row.try_get("account_non_locked")?,
		credentials_non_expired: row.try_get("credentials_non_expired")?,
		last_login: parse_optional_timestamp(last_login.as_deref(), "last_login")?,
	};

	Ok(UserRecord {
		user,
		reference_id: reference_id
			.parse()
			.map_err(|e| DbError::Internal(format!("Invalid reference_id UUID: {e}")))?,
		audit: restore_audit(row)?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_test_pool;
	use chrono::TimeZone;
	use vault_server_audit::FixedClock;

	fn t0() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
	}

	fn new_user(email: &str) -> NewUser {
		NewUser {
			first_name: "Grace".to_string(),
			last_name: "Hopper".to_string(),
			email: email.to_string(),
			phone: Some("555-0100".to_string()),
			role: Role::User,
		}
	}

	async fn make_repo() -> (UserRepository, Arc<FixedClock>) {
		let clock = Arc::new(FixedClock::new(t0()));
		let repo = UserRepository::with_clock(create_test_pool().await, clock.clone());
		(repo, clock)
	}

	#[tokio::test]
	async fn create_user_stamps_actor_and_assigns_id() {
		let (repo, _) = make_repo().await;

		let record = repo
			.create_user(new_user("grace@example.com"), "hash-1", &ActorId::SYSTEM)
			.await
			.unwrap();

		assert!(record.user.id.into_inner() > 0);
		assert_eq!(record.audit_fields().created_by(), Some(ActorId::SYSTEM));
		assert_eq!(record.audit_fields().created_at(), Some(t0()));

		let loaded = repo.get_user_by_id(record.user.id).await.unwrap().unwrap();
		assert_eq!(loaded.user, record.user);
		assert_eq!(loaded.reference_id(), record.reference_id());
		assert_eq!(loaded.audit_fields(), record.audit_fields());
	}

	#[tokio::test]
	async fn create_user_without_actor_writes_nothing() {
		let (repo, _) = make_repo().await;

		let err = repo
			.create_user(new_user("nobody@example.com"), "hash-2", &None::<ActorId>)
			.await
			.unwrap_err();

		assert!(matches!(err, DbError::Audit(ref e) if e.is_missing_actor()));
		assert!(repo
			.get_user_by_email("nobody@example.com")
			.await
			.unwrap()
			.is_none());
	}

	#[tokio::test]
	async fn duplicate_email_is_conflict() {
		let (repo, _) = make_repo().await;
		repo
			.create_user(new_user("dup@example.com"), "hash-a", &ActorId::SYSTEM)
			.await
			.unwrap();

		let err = repo
			.create_user(new_user("dup@example.com"), "hash-b", &ActorId::SYSTEM)
			.await
			.unwrap_err();
		assert!(matches!(err, DbError::Conflict(_)));
	}

	#[tokio::test]
	async fn lookup_by_token_hash() {
		let (repo, _) = make_repo().await;
		let record = repo
			.create_user(new_user("token@example.com"), "abc123", &ActorId::SYSTEM)
			.await
			.unwrap();

		let found = repo.get_user_by_token_hash("abc123").await.unwrap().unwrap();
		assert_eq!(found.user.id, record.user.id);
		assert!(repo.get_user_by_token_hash("nope").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn record_login_restamps_updater_only() {
		let (repo, clock) = make_repo().await;
		let record = repo
			.create_user(new_user("login@example.com"), "h", &ActorId::SYSTEM)
			.await
			.unwrap();

		clock.advance(chrono::Duration::hours(1));
		let login_at = clock.now();
		repo.record_login(record.user.id, login_at).await.unwrap();

		let loaded = repo.get_user_by_id(record.user.id).await.unwrap().unwrap();
		assert_eq!(loaded.user.last_login, Some(login_at));
		assert_eq!(loaded.audit_fields().created_by(), Some(ActorId::SYSTEM));
		assert_eq!(
			loaded.audit_fields().updated_by(),
			Some(record.user.id.actor_id())
		);
		assert_eq!(loaded.audit_fields().updated_at(), Some(login_at));
	}

	#[tokio::test]
	async fn record_login_for_unknown_user_is_not_found() {
		let (repo, _) = make_repo().await;
		let err = repo.record_login(UserId::new(404), t0()).await.unwrap_err();
		assert!(matches!(err, DbError::NotFound(_)));
	}

	#[tokio::test]
	async fn dev_user_is_created_once() {
		let (repo, _) = make_repo().await;
		let first = repo.find_or_create_dev_user().await.unwrap();
		let second = repo.find_or_create_dev_user().await.unwrap();
		assert_eq!(first.user.id, second.user.id);
		assert_eq!(first.user.role, Role::SuperAdmin);
	}
}
