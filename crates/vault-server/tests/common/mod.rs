// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared fixtures for the HTTP integration tests.

#![allow(dead_code)]

use axum::{
	body::Body,
	http::{header, Request, StatusCode},
	Router,
};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;
use vault_server::{create_app_state, create_router, AppState, ServerConfig};
use vault_server_audit::ActorId;
use vault_server_auth::{generate_access_token, Role};
use vault_server_db::{NewUser, UserRepository};

pub const BOUNDARY: &str = "vault-test-boundary";

/// A router over an isolated database and data directory.
pub struct TestApp {
	pub router: Router,
	pub state: AppState,
	pub pool: SqlitePool,
	pub dir: TempDir,
}

impl TestApp {
	pub async fn new() -> Self {
		Self::with_dev_mode(false).await
	}

	pub async fn with_dev_mode(dev_mode: bool) -> Self {
		Self::with_config(|config| config.auth.dev_mode = dev_mode).await
	}

	/// Build over the test defaults after `configure` has adjusted them.
	pub async fn with_config(configure: impl FnOnce(&mut ServerConfig)) -> Self {
		let dir = tempfile::tempdir().unwrap();
		let db_path = dir.path().join("test.db");
		let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
		let pool = vault_server_db::create_pool(&db_url, 5).await.unwrap();
		vault_server_db::run_migrations(&pool).await.unwrap();

		let mut config = ServerConfig::default();
		config.paths.data_dir = dir.path().join("data").display().to_string();
		config.http.base_url = "http://vault.test".to_string();
		configure(&mut config);

		let state = create_app_state(pool.clone(), &config).await.unwrap();
		Self {
			router: create_router(state.clone()),
			state,
			pool,
			dir,
		}
	}

	/// Create a user with a fixed id and return its bearer token.
	pub async fn create_user(&self, id: i64, first_name: &str, last_name: &str, role: Role) -> String {
		let (token, token_hash) = generate_access_token();
		let record = UserRepository::new(self.pool.clone())
			.create_user(
				NewUser {
					first_name: first_name.to_string(),
					last_name: last_name.to_string(),
					email: format!("{}@example.com", first_name.to_lowercase()),
					phone: Some("+44 20 7946 0000".to_string()),
					role,
				},
				&token_hash,
				&ActorId::SYSTEM,
			)
			.await
			.unwrap();

		sqlx::query("UPDATE users SET id = ? WHERE id = ?")
			.bind(id)
			.bind(record.user.id.into_inner())
			.execute(&self.pool)
			.await
			.unwrap();
		token
	}

	pub async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
		let response = self.router.clone().oneshot(request).await.unwrap();
		let status = response.status();
		let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
			.await
			.unwrap();
		let json = serde_json::from_slice(&bytes).unwrap();
		(status, json)
	}

	pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
		let mut builder = Request::builder().uri(uri);
		if let Some(token) = token {
			builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
		}
		self.send(builder.body(Body::empty()).unwrap()).await
	}

	pub async fn upload(&self, files: &[(&str, &str)], token: &str) -> (StatusCode, serde_json::Value) {
		let request = Request::builder()
			.method("POST")
			.uri("/documents/upload")
			.header(header::AUTHORIZATION, format!("Bearer {token}"))
			.header(
				header::CONTENT_TYPE,
				format!("multipart/form-data; boundary={BOUNDARY}"),
			)
			.body(Body::from(multipart_body(files)))
			.unwrap();
		self.send(request).await
	}

	pub async fn update(&self, body: serde_json::Value, token: &str) -> (StatusCode, serde_json::Value) {
		let request = Request::builder()
			.method("PATCH")
			.uri("/documents")
			.header(header::AUTHORIZATION, format!("Bearer {token}"))
			.header(header::CONTENT_TYPE, "application/json")
			.body(Body::from(body.to_string()))
			.unwrap();
		self.send(request).await
	}

	/// `(created_by, updated_by)` as stored for a document.
	pub async fn audit_columns(&self, document_id: &str) -> (i64, i64) {
		sqlx::query_as("SELECT created_by, updated_by FROM documents WHERE document_id = ?")
			.bind(document_id)
			.fetch_one(&self.pool)
			.await
			.unwrap()
	}

	pub fn stored_file(&self, name: &str) -> std::path::PathBuf {
		self.dir.path().join("data").join("documents").join(name)
	}
}

/// Build a multipart body with one `files` part per entry.
pub fn multipart_body(files: &[(&str, &str)]) -> Vec<u8> {
	let mut body = Vec::new();
	for (name, content) in files {
		body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
		body.extend_from_slice(
			format!("Content-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\n")
				.as_bytes(),
		);
		body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
		body.extend_from_slice(content.as_bytes());
		body.extend_from_slice(b"\r\n");
	}
	body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
	body
}
