// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Document metadata repository.
//!
//! Documents are global: any user holding `document:read` sees every row. Each
//! row records its owner (the uploader) and carries the four audit columns,
//! which are stamped inside the same transaction as the write that persists
//! them. A failed stamp rolls the transaction back, so a row is never committed
//! without an actor.
//!
//! Reads return [`DocumentDetails`], which joins the owner and the last updater
//! from `users` so the HTTP layer can render names without further queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use std::sync::Arc;
use uuid::Uuid;
use vault_server_audit::{
	ActorSource, AuditFields, AuditStamper, Auditable, Clock, ReferenceId, SystemClock,
};
use vault_server_auth::UserId;

use crate::error::DbError;
use crate::timestamps::parse_optional_timestamp;
use crate::user::{audit_columns, restore_audit};

/// Fields known about an upload before it is persisted.
#[derive(Debug, Clone)]
pub struct NewDocument {
	pub name: String,
	pub description: Option<String>,
	pub uri: String,
	pub size: i64,
	pub formatted_size: String,
	pub icon: String,
	pub extension: String,
	pub owner_id: UserId,
}

/// A document metadata row.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
	id: Option<i64>,
	reference_id: ReferenceId,
	pub document_id: String,
	pub name: String,
	pub description: Option<String>,
	pub uri: String,
	pub size: i64,
	pub formatted_size: String,
	pub icon: String,
	pub extension: String,
	pub owner_id: UserId,
	audit: AuditFields,
}

impl Document {
	/// An unsaved document with fresh reference and document ids.
	pub fn new(new_document: NewDocument) -> Self {
		Self {
			id: None,
			reference_id: ReferenceId::generate(),
			document_id: Uuid::new_v4().to_string(),
			name: new_document.name,
			description: new_document.description,
			uri: new_document.uri,
			size: new_document.size,
			formatted_size: new_document.formatted_size,
			icon: new_document.icon,
			extension: new_document.extension,
			owner_id: new_document.owner_id,
			audit: AuditFields::unstamped(),
		}
	}

	/// Database identity; `None` until inserted.
	pub fn id(&self) -> Option<i64> {
		self.id
	}
}

impl Auditable for Document {
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

/// A document joined with its owner and last updater.
#[derive(Debug, Clone)]
pub struct DocumentDetails {
	pub document: Document,
	pub owner_name: String,
	pub owner_email: String,
	pub owner_phone: Option<String>,
	pub owner_last_login: Option<DateTime<Utc>>,
	/// Empty when the updater is not a stored user (e.g. the system actor).
	pub updater_name: String,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
	async fn create_documents(
		&self,
		documents: &mut [Document],
		actor: &(dyn ActorSource + Sync),
	) -> Result<(), DbError>;
	async fn get_document_by_document_id(
		&self,
		document_id: &str,
	) -> Result<Option<DocumentDetails>, DbError>;
	async fn list_documents(
		&self,
		page: u32,
		size: u32,
	) -> Result<(Vec<DocumentDetails>, i64), DbError>;
	async fn search_documents(
		&self,
		name: &str,
		page: u32,
		size: u32,
	) -> Result<(Vec<DocumentDetails>, i64), DbError>;
	async fn update_document(
		&self,
		document: &mut Document,
		actor: &(dyn ActorSource + Sync),
	) -> Result<(), DbError>;
	async fn exists_by_name(&self, name: &str) -> Result<bool, DbError>;
}

#[async_trait]
impl DocumentStore for DocumentRepository {
	async fn create_documents(
		&self,
		documents: &mut [Document],
		actor: &(dyn ActorSource + Sync),
	) -> Result<(), DbError> {
		self.create_documents(documents, actor).await
	}

	async fn get_document_by_document_id(
		&self,
		document_id: &str,
	) -> Result<Option<DocumentDetails>, DbError> {
		self.get_document_by_document_id(document_id).await
	}

	async fn list_documents(
		&self,
		page: u32,
		size: u32,
	) -> Result<(Vec<DocumentDetails>, i64), DbError> {
		self.list_documents(page, size).await
	}

	async fn search_documents(
		&self,
		name: &str,
		page: u32,
		size: u32,
	) -> Result<(Vec<DocumentDetails>, i64), DbError> {
		self.search_documents(name, page, size).await
	}

	async fn update_document(
		&self,
		document: &mut Document,
		actor: &(dyn ActorSource + Sync),
	) -> Result<(), DbError> {
		self.update_document(document, actor).await
	}

	async fn exists_by_name(&self, name: &str) -> Result<bool, DbError> {
		self.exists_by_name(name).await
	}
}

/// Repository for document database operations.
#[derive(Clone)]
pub struct DocumentRepository {
	pool: SqlitePool,
	stamper: AuditStamper<Arc<dyn Clock>>,
}

const DETAILS_SELECT: &str = r#"
	SELECT
		d.id, d.reference_id, d.document_id, d.name, d.description, d.uri, d.size,
		d.formatted_size, d.icon, d.extension, d.owner_id,
		d.created_by, d.updated_by, d.created_at, d.updated_at,
		o.first_name || ' ' || o.last_name AS owner_name,
		o.email AS owner_email,
		o.phone AS owner_phone,
		o.last_login AS owner_last_login,
		COALESCE(u.first_name || ' ' || u.last_name, '') AS updater_name
	FROM documents d
	JOIN users o ON o.id = d.owner_id
	LEFT JOIN users u ON u.id = d.updated_by
"#;

const PAGE_ORDER: &str = "ORDER BY d.updated_at DESC, d.id DESC LIMIT ? OFFSET ?";

impl DocumentRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self::with_clock(pool, Arc::new(SystemClock))
	}

	pub fn with_clock(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
		Self {
			pool,
			stamper: AuditStamper::new(clock),
		}
	}

	/// Insert a batch of documents in one transaction, all stamped by `actor`.
	///
	/// On success each document's `id` is populated.
	///
	/// # Errors
	/// - `DbError::Audit` when `actor` resolves to nothing; no row is written.
	/// - `DbError::Conflict` when a name is already taken; no row is written.
	#[tracing::instrument(skip(self, documents, actor), fields(count = documents.len()))]
	pub async fn create_documents(
		&self,
		documents: &mut [Document],
		actor: &(dyn ActorSource + Sync),
	) -> Result<(), DbError> {
		let mut tx = self.pool.begin().await?;
		let mut ids = Vec::with_capacity(documents.len());

		for document in documents.iter_mut() {
			self.stamper.on_first_persist(document, actor)?;
			let (created_by, created_at, updated_by, updated_at) = audit_columns(&document.audit)?;

			let result = sqlx::query(
				r#"
				INSERT INTO documents (
					reference_id, document_id, name, description, uri, size,
					formatted_size, icon, extension, owner_id,
					created_by, updated_by, created_at, updated_at
				) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
				"#,
			)
			.bind(document.reference_id.to_string())
			.bind(&document.document_id)
			.bind(&document.name)
			.bind(&document.description)
			.bind(&document.uri)
			.bind(document.size)
			.bind(&document.formatted_size)
			.bind(&document.icon)
			.bind(&document.extension)
			.bind(document.owner_id.into_inner())
			.bind(created_by)
			.bind(updated_by)
			.bind(created_at)
			.bind(updated_at)
			.execute(&mut *tx)
			.await
			.map_err(|e| {
				DbError::from_write(e, || {
					format!("Document with name {} already exists", document.name)
				})
			})?;

			ids.push(result.last_insert_rowid());
		}

		tx.commit().await?;

		for (document, id) in documents.iter_mut().zip(ids) {
			document.id = Some(id);
		}
		tracing::debug!("documents created");
		Ok(())
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_document_by_document_id(
		&self,
		document_id: &str,
	) -> Result<Option<DocumentDetails>, DbError> {
		let row = sqlx::query(&format!("{DETAILS_SELECT} WHERE d.document_id = ?"))
			.bind(document_id)
			.fetch_optional(&self.pool)
			.await?;

		row.as_ref().map(parse_details_row).transpose()
	}

	/// One page of all documents, most recently updated first.
	#[tracing::instrument(skip(self))]
	pub async fn list_documents(
		&self,
		page: u32,
		size: u32,
	) -> Result<(Vec<DocumentDetails>, i64), DbError> {
		let (limit, offset) = limit_offset(page, size);

		let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
			.fetch_one(&self.pool)
			.await?;

		let rows = sqlx::query(&format!("{DETAILS_SELECT} {PAGE_ORDER}"))
			.bind(limit)
			.bind(offset)
			.fetch_all(&self.pool)
			.await?;

		let documents = rows
			.iter()
			.map(parse_details_row)
			.collect::<Result<Vec<_>, _>>()?;
		Ok((documents, total))
	}

	/// One page of documents whose name contains `name`, case-insensitively.
	///
	/// `%` and `_` in `name` match literally.
	#[tracing::instrument(skip(self))]
	pub async fn search_documents(
		&self,
		name: &str,
		page: u32,
		size: u32,
	) -> Result<(Vec<DocumentDetails>, i64), DbError> {
		let (limit, offset) = limit_offset(page, size);
		let pattern = format!("%{}%", escape_like(name));

		let total: i64 = sqlx::query_scalar(
			"SELECT COUNT(*) FROM documents WHERE name LIKE ? ESCAPE '\\'",
		)
		.bind(&pattern)
		.fetch_one(&self.pool)
		.await?;

		let rows = sqlx::query(&format!(
			"{DETAILS_SELECT} WHERE d.name LIKE ? ESCAPE '\\' {PAGE_ORDER}"
		))
		.bind(&pattern)
		.bind(limit)
		.bind(offset)
		.fetch_all(&self.pool)
		.await?;

		let documents = rows
			.iter()
			.map(parse_details_row)
			.collect::<Result<Vec<_>, _>>()?;
		Ok((documents, total))
	}

	/// Persist changes to the mutable fields of an existing document, re-stamped
	/// by `actor`. Creator columns are never written.
	///
	/// # Errors
	/// - `DbError::Audit` when `actor` resolves to nothing or the document was
	///   never persisted.
	/// - `DbError::NotFound` when the row no longer exists.
	/// - `DbError::Conflict` when the new name is already taken.
	#[tracing::instrument(skip(self, document, actor), fields(document_id = %document.document_id))]
	pub async fn update_document(
		&self,
		document: &mut Document,
		actor: &(dyn ActorSource + Sync),
	) -> Result<(), DbError> {
		let mut tx = self.pool.begin().await?;

		self.stamper.on_update(document, actor)?;
		let id = document
			.id
			.ok_or_else(|| DbError::Internal("stamped document has no id".to_string()))?;
		let (_, _, updated_by, updated_at) = audit_columns(&document.audit)?;

		let result = sqlx::query(
			r#"
			UPDATE documents
			SET name = ?, description = ?, uri = ?, icon = ?, extension = ?,
				updated_by = ?, updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(&document.name)
		.bind(&document.description)
		.bind(&document.uri)
		.bind(&document.icon)
		.bind(&document.extension)
		.bind(updated_by)
		.bind(updated_at)
		.bind(id)
		.execute(&mut *tx)
		.await
		.map_err(|e| {
			DbError::from_write(e, || {
				format!("Document with name {} already exists", document.name)
			})
		})?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!(
				"Document {}",
				document.document_id
			)));
		}

		tx.commit().await?;
		Ok(())
	}

	#[tracing::instrument(skip(self))]
	pub async fn exists_by_name(&self, name: &str) -> Result<bool, DbError> {
		let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE name = ?")
			.bind(name)
			.fetch_one(&self.pool)
			.await?;
		Ok(count > 0)
	}
}

fn limit_offset(page: u32, size: u32) -> (i64, i64) {
	let size = i64::from(size.max(1));
	(size, i64::from(page) * size)
}

fn escape_like(value: &str) -> String {
	let mut escaped = String::with_capacity(value.len());
	for c in value.chars() {
		if matches!(c, '%' | '_' | '\\') {
			escaped.push('\\');
		}
		escaped.push(c);
	}
	escaped
}

fn parse_details_row(row: &SqliteRow) -> Result<DocumentDetails, DbError> {
	let reference_id: String = row.try_get("reference_id")?;
	let owner_last_login: Option<String> = row.try_get("owner_last_login")?;

	let document = Document {
		id: Some(row.try_get("id")?),
		reference_id: reference_id
			.parse()
			.map_err(|e| DbError::Internal(format!("Invalid reference_id UUID: {e}")))?,
		document_id: row.try_get("document_id")?,
		name: row.try_get("name")?,
		description: row.try_get("description")?,
		uri: row.try_get("uri")?,
		size: row.try_get("size")?,
		formatted_size: row.try_get("formatted_size")?,
		icon: row.try_get("icon")?,
		extension: row.try_get("extension")?,
		owner_id: UserId::new(row.try_get("owner_id")?),
		audit: restore_audit(row)?,
	};

	Ok(DocumentDetails {
		document,
		owner_name: row.try_get("owner_name")?,
		owner_email: row.try_get("owner_email")?,
		owner_phone: row.try_get("owner_phone")?,
		owner_last_login: parse_optional_timestamp(owner_last_login.as_deref(), "last_login")?,
		updater_name: row.try_get("updater_name")?,
	})
}
