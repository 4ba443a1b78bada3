// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Document HTTP handlers.
//!
//! Every handler answers with the [`ApiResponse`] envelope, on success and on
//! failure, with the request path recorded in `path`.

use axum::{
	extract::{
		multipart::{MultipartError, MultipartRejection},
		rejection::{JsonRejection, QueryRejection},
		Multipart, OriginalUri, Path, Query, State,
	},
	http::StatusCode,
	Json,
};
use serde::Serialize;
use vault_server_api::{
	build_success, payload, ApiResponse, DocumentPage, DocumentResponse, UpdateDocumentRequest,
	DOCUMENTS_KEY, DOCUMENTS_RETRIEVED, DOCUMENTS_UPLOADED, DOCUMENT_RETRIEVED, DOCUMENT_UPDATED,
};

use crate::{
	api::AppState,
	auth_middleware::RequireAuth,
	document_service::UploadedFile,
	error::ServerError,
	pagination::{PageParams, SearchParams},
};

/// Multipart field carrying uploaded files.
pub const FILES_FIELD: &str = "files";

#[utoipa::path(
    post,
    path = "/documents/upload",
    responses(
        (status = 201, description = "Documents uploaded", body = ApiResponse),
        (status = 400, description = "No files or invalid file name", body = ApiResponse),
        (status = 401, description = "Not logged in", body = ApiResponse),
        (status = 403, description = "Missing document:create", body = ApiResponse),
        (status = 409, description = "Name already taken", body = ApiResponse),
        (status = 413, description = "Upload exceeds the size limit", body = ApiResponse)
    ),
    tag = "documents"
)]
/// POST /documents/upload - Store one or more `files` parts as documents.
#[axum::debug_handler]
pub async fn upload_documents(
	State(state): State<AppState>,
	OriginalUri(uri): OriginalUri,
	RequireAuth(current_user): RequireAuth,
	multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse, ApiResponse> {
	let path = uri.path();
	let multipart = multipart.map_err(|rejection| {
		ServerError::Rejected {
			status: rejection.status(),
			message: rejection.body_text(),
		}
		.into_envelope(path)
	})?;
	let uploads = read_uploads(multipart)
		.await
		.map_err(|e| e.into_envelope(path))?;

	tracing::debug!(count = uploads.len(), user_id = %current_user.user_id(), "uploading documents");

	let documents = state
		.documents
		.upload_documents(uploads, &current_user)
		.await
		.map_err(|e| e.into_envelope(path))?;

	envelope(path, &documents, DOCUMENTS_UPLOADED, StatusCode::CREATED)
}

#[utoipa::path(
    get,
    path = "/documents",
    params(PageParams),
    responses(
        (status = 200, description = "One page of documents", body = ApiResponse),
        (status = 401, description = "Not logged in", body = ApiResponse),
        (status = 403, description = "Missing document:read", body = ApiResponse)
    ),
    tag = "documents"
)]
#[axum::debug_handler]
pub async fn get_documents(
	State(state): State<AppState>,
	OriginalUri(uri): OriginalUri,
	params: Result<Query<PageParams>, QueryRejection>,
) -> Result<ApiResponse, ApiResponse> {
	let path = uri.path();
	let Query(params) = params
		.map_err(|rejection| ServerError::BadRequest(rejection.body_text()).into_envelope(path))?;

	let page: DocumentPage = state
		.documents
		.get_documents(params.page_or_default(), params.size_clamped())
		.await
		.map_err(|e| e.into_envelope(path))?;

	envelope(path, &page, DOCUMENTS_RETRIEVED, StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/documents/search",
    params(SearchParams),
    responses(
        (status = 200, description = "One page of matching documents", body = ApiResponse),
        (status = 401, description = "Not logged in", body = ApiResponse),
        (status = 403, description = "Missing document:read", body = ApiResponse)
    ),
    tag = "documents"
)]
#[axum::debug_handler]
pub async fn search_documents(
	State(state): State<AppState>,
	OriginalUri(uri): OriginalUri,
	params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<ApiResponse, ApiResponse> {
	let path = uri.path();
	let Query(params) = params
		.map_err(|rejection| ServerError::BadRequest(rejection.body_text()).into_envelope(path))?;
	let paging = params.paging();

	let page = state
		.documents
		.search_documents(
			params.name_filter(),
			paging.page_or_default(),
			paging.size_clamped(),
		)
		.await
		.map_err(|e| e.into_envelope(path))?;

	envelope(path, &page, DOCUMENTS_RETRIEVED, StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/documents/{documentId}",
    params(
        ("documentId" = String, Path, description = "Public document identifier")
    ),
    responses(
        (status = 200, description = "Document found", body = ApiResponse),
        (status = 401, description = "Not logged in", body = ApiResponse),
        (status = 404, description = "Document not found", body = ApiResponse)
    ),
    tag = "documents"
)]
#[axum::debug_handler]
pub async fn get_document(
	State(state): State<AppState>,
	OriginalUri(uri): OriginalUri,
	Path(document_id): Path<String>,
) -> Result<ApiResponse, ApiResponse> {
	let path = uri.path();

	let document: DocumentResponse = state
		.documents
		.get_document(&document_id)
		.await
		.map_err(|e| e.into_envelope(path))?;

	envelope(path, &document, DOCUMENT_RETRIEVED, StatusCode::OK)
}

#[utoipa::path(
    patch,
    path = "/documents",
    request_body = UpdateDocumentRequest,
    responses(
        (status = 200, description = "Document updated", body = ApiResponse),
        (status = 400, description = "Invalid request", body = ApiResponse),
        (status = 401, description = "Not logged in", body = ApiResponse),
        (status = 403, description = "Missing document:update", body = ApiResponse),
        (status = 404, description = "Document not found", body = ApiResponse),
        (status = 409, description = "Name already taken", body = ApiResponse)
    ),
    tag = "documents"
)]
#[axum::debug_handler]
pub async fn update_document(
	State(state): State<AppState>,
	OriginalUri(uri): OriginalUri,
	RequireAuth(current_user): RequireAuth,
	body: Result<Json<UpdateDocumentRequest>, JsonRejection>,
) -> Result<ApiResponse, ApiResponse> {
	let path = uri.path();
	let Json(request) = body
		.map_err(|rejection| ServerError::BadRequest(rejection.body_text()).into_envelope(path))?;

	let document = state
		.documents
		.update_document(request, &current_user)
		.await
		.map_err(|e| e.into_envelope(path))?;

	envelope(path, &document, DOCUMENT_UPDATED, StatusCode::OK)
}

/// Collect every `files` part that names a file.
///
/// Read failures keep the status axum assigns them, so an oversized body is a 413.
async fn read_uploads(mut multipart: Multipart) -> Result<Vec<UploadedFile>, ServerError> {
	let mut uploads = Vec::new();
	while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
		if field.name() != Some(FILES_FIELD) {
			continue;
		}
		let Some(file_name) = field.file_name().map(str::to_string) else {
			continue;
		};
		let bytes = field.bytes().await.map_err(multipart_error)?;
		uploads.push(UploadedFile { file_name, bytes });
	}
	Ok(uploads)
}

fn multipart_error(e: MultipartError) -> ServerError {
	ServerError::Rejected {
		status: e.status(),
		message: e.body_text(),
	}
}

fn envelope<T: Serialize + ?Sized>(
	path: &str,
	value: &T,
	message: &str,
	status: StatusCode,
) -> Result<ApiResponse, ApiResponse> {
	let data = payload(DOCUMENTS_KEY, value)
		.map_err(|e| ServerError::Serialization(e).into_envelope(path))?;
	Ok(build_success(path, data, message, status))
}
