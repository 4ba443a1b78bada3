// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use vault_server_auth::Role;

use crate::migrations::run_migrations;

/// Single-connection in-memory pool; every connection to `:memory:` is a new database.
pub async fn create_bare_pool() -> SqlitePool {
	SqlitePoolOptions::new()
		.max_connections(1)
		.connect(":memory:")
		.await
		.unwrap()
}

pub async fn create_test_pool() -> SqlitePool {
	let pool = create_bare_pool().await;
	run_migrations(&pool).await.unwrap();
	pool
}

/// Insert a user row with a fixed id, stamped by the system actor.
pub async fn insert_user_with_id(pool: &SqlitePool, id: i64, email: &str, role: Role) {
	sqlx::query(
		r#"
		INSERT INTO users (
			id, reference_id, user_id, first_name, last_name, email, phone, role,
			token_hash, created_by, updated_by, created_at, updated_at
		) VALUES (?, ?, ?, ?, ?, ?, NULL, ?, ?, 0, 0, ?, ?)
		"#,
	)
	.bind(id)
	.bind(uuid::Uuid::new_v4().to_string())
	.bind(uuid::Uuid::new_v4().to_string())
	.bind("User")
	.bind(id.to_string())
	.bind(email)
	.bind(role.as_str())
	.bind(format!("test-hash-{id}"))
	.bind("2025-01-01T00:00:00.000000Z")
	.bind("2025-01-01T00:00:00.000000Z")
	.execute(pool)
	.await
	.unwrap();
}
