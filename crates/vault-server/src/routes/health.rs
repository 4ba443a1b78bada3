// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Health HTTP handler.

use axum::{
	extract::{OriginalUri, State},
	http::StatusCode,
};
use sqlx::SqlitePool;
use vault_server_api::{
	build_error, build_success, payload, root_cause_message, ApiFailure, ApiResponse,
	HealthComponent, HealthResponse, HealthStatus, HEALTH_KEY, SERVICE_HEALTHY,
};

use crate::{api::AppState, error::ServerError, storage::FileStore};

pub const SERVICE_UNHEALTHY: &str = "Service is unhealthy.";

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = ApiResponse),
        (status = 503, description = "Database or storage unavailable", body = ApiResponse)
    ),
    tag = "health"
)]
/// GET /health - Database and storage checks. No authentication.
///
/// A failing check answers 503 with an empty payload; its root cause goes to
/// `exception` only.
pub async fn health_check(
	State(state): State<AppState>,
	OriginalUri(uri): OriginalUri,
) -> Result<ApiResponse, ApiResponse> {
	let path = uri.path();

	let (database, storage) = tokio::join!(
		check_database(&state.pool),
		check_storage(state.documents.files())
	);

	if let Some(failure) = database.err().or(storage.err()) {
		return Err(build_error(
			path,
			SERVICE_UNHEALTHY,
			root_cause_message(&failure),
			StatusCode::SERVICE_UNAVAILABLE,
		));
	}

	let response = HealthResponse {
		status: HealthStatus::Healthy,
		version: crate::version::VERSION.to_string(),
		database: healthy(),
		storage: healthy(),
	};

	let data = payload(HEALTH_KEY, &response)
		.map_err(|e| ServerError::Serialization(e).into_envelope(path))?;
	Ok(build_success(path, data, SERVICE_HEALTHY, StatusCode::OK))
}

async fn check_database(pool: &SqlitePool) -> Result<(), ApiFailure> {
	sqlx::query("SELECT 1")
		.execute(pool)
		.await
		.map(|_| ())
		.map_err(|e| {
			tracing::warn!(error = %e, "database health check failed");
			ApiFailure::internal_from("database check failed", e)
		})
}

async fn check_storage(files: &FileStore) -> Result<(), ApiFailure> {
	files.check().await.map_err(|e| {
		tracing::warn!(error = %e, "storage health check failed");
		ApiFailure::internal_from("storage check failed", e)
	})
}

fn healthy() -> HealthComponent {
	HealthComponent {
		status: HealthStatus::Healthy,
	}
}
