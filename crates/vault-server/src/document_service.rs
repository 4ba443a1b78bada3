// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Document use cases behind the HTTP handlers.
//!
//! Uploads write bytes to the [`FileStore`] first and then insert metadata in
//! one transaction. If the insert fails the written files are removed again, so
//! storage never holds bytes without a row. Renames move the file before the
//! row is updated and move it back if the update fails.

use std::collections::HashSet;
use std::sync::Arc;

use axum::body::Bytes;
use tracing::instrument;
use vault_server_api::{DocumentPage, DocumentResponse, UpdateDocumentRequest};
use vault_server_audit::Auditable;
use vault_server_auth::CurrentUser;
use vault_server_db::{DbError, Document, DocumentDetails, DocumentStore, NewDocument};

use crate::error::ServerError;
use crate::storage::{sanitize_file_name, FileStore};

/// One file taken from a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
	pub file_name: String,
	pub bytes: Bytes,
}

#[derive(Clone)]
pub struct DocumentService {
	documents: Arc<dyn DocumentStore>,
	files: FileStore,
}

impl DocumentService {
	pub fn new(documents: Arc<dyn DocumentStore>, files: FileStore) -> Self {
		Self { documents, files }
	}

	pub fn files(&self) -> &FileStore {
		&self.files
	}

	/// Store each uploaded file and record it as owned by `user`.
	#[instrument(skip(self, uploads, user), fields(count = uploads.len(), user_id = %user.user_id()))]
	pub async fn upload_documents(
		&self,
		uploads: Vec<UploadedFile>,
		user: &CurrentUser,
	) -> Result<Vec<DocumentResponse>, ServerError> {
		if uploads.is_empty() {
			return Err(ServerError::BadRequest("No files were uploaded".to_string()));
		}

		let mut seen = HashSet::new();
		let mut named = Vec::with_capacity(uploads.len());
		for upload in uploads {
			let name = sanitize_file_name(&upload.file_name)?;
			if !seen.insert(name.clone()) || self.documents.exists_by_name(&name).await? {
				return Err(ServerError::duplicate_name(&name));
			}
			named.push((name, upload.bytes));
		}

		let mut stored = Vec::with_capacity(named.len());
		for (name, bytes) in &named {
			match self.files.save(name, bytes).await {
				Ok(file) => stored.push(file),
				Err(e) => {
					self.discard(&stored).await;
					return Err(e.into());
				}
			}
		}

		let mut documents: Vec<Document> = stored
			.iter()
			.map(|file| {
				Document::new(NewDocument {
					name: file.name.clone(),
					description: None,
					uri: file.uri.clone(),
					size: file.size as i64,
					formatted_size: file.formatted_size.clone(),
					icon: file.icon.clone(),
					extension: file.extension.clone(),
					owner_id: user.user_id(),
				})
			})
			.collect();

		if let Err(e) = self.documents.create_documents(&mut documents, user).await {
			self.discard(&stored).await;
			return Err(e.into());
		}

		tracing::info!(count = documents.len(), "documents uploaded");

		let mut responses = Vec::with_capacity(documents.len());
		for document in &documents {
			responses.push(self.get_document(&document.document_id).await?);
		}
		Ok(responses)
	}

	#[instrument(skip(self))]
	pub async fn get_documents(&self, page: u32, size: u32) -> Result<DocumentPage, ServerError> {
		let (rows, total) = self.documents.list_documents(page, size).await?;
		to_page(rows, page, size, total)
	}

	/// Search by name; `None` lists everything.
	#[instrument(skip(self))]
	pub async fn search_documents(
		&self,
		name: Option<&str>,
		page: u32,
		size: u32,
	) -> Result<DocumentPage, ServerError> {
		let (rows, total) = match name {
			Some(name) => self.documents.search_documents(name, page, size).await?,
			None => self.documents.list_documents(page, size).await?,
		};
		to_page(rows, page, size, total)
	}

	#[instrument(skip(self))]
	pub async fn get_document(&self, document_id: &str) -> Result<DocumentResponse, ServerError> {
		let details = self
			.documents
			.get_document_by_document_id(document_id)
			.await?
			.ok_or_else(ServerError::document_not_found)?;
		to_response(&details)
	}

	/// Rename and re-describe a document on behalf of `user`.
	#[instrument(skip(self, request, user), fields(document_id = %request.document_id, user_id = %user.user_id()))]
	pub async fn update_document(
		&self,
		request: UpdateDocumentRequest,
		user: &CurrentUser,
	) -> Result<DocumentResponse, ServerError> {
		let details = self
			.documents
			.get_document_by_document_id(&request.document_id)
			.await?
			.ok_or_else(ServerError::document_not_found)?;
		let mut document = details.document;

		let new_name = sanitize_file_name(&request.name)?;
		let old_name = document.name.clone();
		if new_name != old_name && self.documents.exists_by_name(&new_name).await? {
			return Err(ServerError::duplicate_name(&new_name));
		}

		let described = self.files.describe(&new_name, document.size.max(0) as u64);
		document.name = new_name.clone();
		document.description = request.description;
		document.uri = described.uri;
		document.icon = described.icon;
		document.extension = described.extension;

		self.files.rename(&old_name, &new_name).await?;

		if let Err(e) = self.documents.update_document(&mut document, user).await {
			if let Err(undo) = self.files.rename(&new_name, &old_name).await {
				tracing::error!(error = %undo, "failed to restore file after rejected update");
			}
			return Err(match e {
				DbError::NotFound(_) => ServerError::document_not_found(),
				other => other.into(),
			});
		}

		self.get_document(&request.document_id).await
	}

	async fn discard(&self, stored: &[crate::storage::StoredFile]) {
		for file in stored {
			if let Err(e) = self.files.remove(&file.name).await {
				tracing::error!(error = %e, name = %file.name, "failed to remove orphaned upload");
			}
		}
	}
}

fn to_page(
	rows: Vec<DocumentDetails>,
	page: u32,
	size: u32,
	total: i64,
) -> Result<DocumentPage, ServerError> {
	let content = rows
		.iter()
		.map(to_response)
		.collect::<Result<Vec<_>, _>>()?;
	Ok(DocumentPage::new(content, page, size, total.max(0) as u64))
}

/// Wire form of a stored document. Never carries the numeric id.
pub fn to_response(details: &DocumentDetails) -> Result<DocumentResponse, ServerError> {
	let document = &details.document;
	let audit = document.audit_fields();
	let (Some(created_at), Some(updated_at)) = (audit.created_at(), audit.updated_at()) else {
		return Err(ServerError::Internal(format!(
			"document {} has no audit timestamps",
			document.document_id
		)));
	};

	Ok(DocumentResponse {
		document_id: document.document_id.clone(),
		reference_id: document.reference_id().to_string(),
		name: document.name.clone(),
		description: document.description.clone(),
		uri: document.uri.clone(),
		size: document.size,
		formatted_size: document.formatted_size.clone(),
		icon: document.icon.clone(),
		extension: document.extension.clone(),
		created_at,
		updated_at,
		owner_name: details.owner_name.clone(),
		owner_email: details.owner_email.clone(),
		owner_phone: details.owner_phone.clone(),
		owner_last_login: details.owner_last_login,
		updater_name: details.updater_name.clone(),
	})
}
