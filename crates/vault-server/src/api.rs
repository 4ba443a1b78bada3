// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router assembly.

use std::sync::Arc;

use axum::{
	extract::DefaultBodyLimit,
	middleware::from_fn_with_state,
	routing::{get, patch, post},
	Json, Router,
};
use sqlx::SqlitePool;
use utoipa::OpenApi;
use vault_server_auth::{AuthConfig, Permission, User};
use vault_server_config::ServerConfig;
use vault_server_db::{DocumentRepository, UserRepository, UserStore};

use crate::{
	access::RequirePermission,
	auth_middleware::{auth_layer, require_auth_layer},
	document_service::DocumentService,
	error::ServerError,
	routes,
	storage::FileStore,
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
	pub pool: SqlitePool,
	pub users: Arc<dyn UserStore>,
	pub documents: DocumentService,
	pub auth_config: AuthConfig,
	pub dev_user: Option<User>,
	pub max_upload_bytes: usize,
}

/// Build the application state from a migrated pool.
///
/// Creates the document directory and, in dev mode, the dev user.
pub async fn create_app_state(
	pool: SqlitePool,
	config: &ServerConfig,
) -> Result<AppState, ServerError> {
	let users = Arc::new(UserRepository::new(pool.clone()));
	let documents = Arc::new(DocumentRepository::new(pool.clone()));

	let files = FileStore::new(config.paths.documents_dir(), config.http.base_url.clone());
	files.ensure_root().await?;

	let auth_config = AuthConfig::new().with_dev_mode(config.auth.dev_mode);
	let dev_user = if auth_config.dev_mode {
		let record = users.find_or_create_dev_user().await?;
		tracing::warn!(
			user_id = %record.user.id,
			email = %record.user.email,
			"dev mode enabled; unauthenticated requests act as the dev user"
		);
		Some(record.user)
	} else {
		None
	};

	Ok(AppState {
		pool,
		users,
		documents: DocumentService::new(documents, files),
		auth_config,
		dev_user,
		max_upload_bytes: usize::try_from(config.storage.max_upload_bytes).unwrap_or(usize::MAX),
	})
}

/// Assemble the router. Tracing and CORS layers are added by the binary.
pub fn create_router(state: AppState) -> Router {
	let documents = Router::new()
		.route(
			"/documents/upload",
			post(routes::documents::upload_documents)
				.route_layer(RequirePermission::new(Permission::DocumentCreate))
				.layer(DefaultBodyLimit::max(state.max_upload_bytes)),
		)
		.route(
			"/documents",
			get(routes::documents::get_documents)
				.route_layer(RequirePermission::new(Permission::DocumentRead))
				.merge(
					patch(routes::documents::update_document)
						.route_layer(RequirePermission::new(Permission::DocumentUpdate)),
				),
		)
		.route(
			"/documents/search",
			get(routes::documents::search_documents)
				.route_layer(RequirePermission::new(Permission::DocumentRead)),
		)
		.route(
			"/documents/{documentId}",
			get(routes::documents::get_document)
				.route_layer(RequirePermission::new(Permission::DocumentRead)),
		)
		.layer(from_fn_with_state(state.clone(), require_auth_layer))
		.layer(from_fn_with_state(state.clone(), auth_layer));

	let public = Router::new()
		.route("/health", get(routes::health::health_check))
		.route(
			"/api/openapi.json",
			get(|| async { Json(crate::api_docs::ApiDoc::openapi()) }),
		);

	Router::new()
		.merge(public)
		.merge(documents)
		.with_state(state)
}
