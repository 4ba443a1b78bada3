// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

pub const DOCUMENTS_KEY: &str = "documents";

pub const DOCUMENTS_UPLOADED: &str = "Document(s) uploaded successfully.";
pub const DOCUMENTS_RETRIEVED: &str = "Document(s) retrieved successfully.";
pub const DOCUMENT_RETRIEVED: &str = "Document retrieved successfully.";
pub const DOCUMENT_UPDATED: &str = "Document updated successfully.";

/// A document in API responses. Never carries the internal numeric id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
	pub document_id: String,
	pub reference_id: String,
	pub name: String,
	pub description: Option<String>,
	pub uri: String,
	pub size: i64,
	pub formatted_size: String,
	pub icon: String,
	pub extension: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	pub owner_name: String,
	pub owner_email: String,
	pub owner_phone: Option<String>,
	pub owner_last_login: Option<DateTime<Utc>>,
	pub updater_name: String,
}

/// One page of documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DocumentPage {
	pub content: Vec<DocumentResponse>,
	pub page: u32,
	pub size: u32,
	pub total_elements: u64,
	pub total_pages: u32,
}

impl DocumentPage {
	pub fn new(content: Vec<DocumentResponse>, page: u32, size: u32, total_elements: u64) -> Self {
		let total_pages = if size == 0 {
			0
		} else {
			total_elements.div_ceil(u64::from(size)) as u32
		};
		Self {
			content,
			page,
			size,
			total_elements,
			total_pages,
		}
	}
}

/// Request body for `PATCH /documents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentRequest {
	pub document_id: String,
	pub name: String,
	pub description: Option<String>,
}
