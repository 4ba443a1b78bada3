// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OpenAPI documentation for vault-server.
//!
//! Generated from the handler annotations with utoipa and served as JSON at
//! `/api/openapi.json`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vault Server API",
        version = "1.0.0",
        description = "Document metadata service. Every response uses the same envelope; every write is stamped with the acting user.",
        license(name = "Proprietary")
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    tags(
        (name = "documents", description = "Document upload, listing, search and update"),
        (name = "health", description = "Health checks")
    ),
    paths(
        crate::routes::documents::upload_documents,
        crate::routes::documents::get_documents,
        crate::routes::documents::search_documents,
        crate::routes::documents::get_document,
        crate::routes::documents::update_document,
        crate::routes::health::health_check,
    ),
    components(schemas(
        vault_server_api::ApiResponse,
        vault_server_api::DocumentResponse,
        vault_server_api::DocumentPage,
        vault_server_api::UpdateDocumentRequest,
        vault_server_api::HealthResponse,
        vault_server_api::HealthComponent,
        vault_server_api::HealthStatus,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_openapi_document_serializes() {
		let doc = ApiDoc::openapi();
		let json = serde_json::to_string_pretty(&doc).expect("should serialize to JSON");

		assert!(json.contains("\"openapi\""));
		assert!(json.contains("Vault Server API"));
	}

	#[test]
	fn test_openapi_document_has_documented_paths() {
		let doc = ApiDoc::openapi();
		let json = serde_json::to_string(&doc).expect("should serialize");

		let expected_paths = [
			"/documents",
			"/documents/upload",
			"/documents/search",
			"/documents/{documentId}",
			"/health",
		];
		for path in expected_paths {
			assert!(json.contains(path), "Missing path: {path}");
		}
	}
}
