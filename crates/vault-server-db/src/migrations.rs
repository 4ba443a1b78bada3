// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::SqlitePool;

use crate::error::DbError;

const MIGRATIONS: &[(&str, &str)] = &[
	(
		"001_create_users",
		include_str!("../migrations/001_create_users.sql"),
	),
	(
		"002_create_documents",
		include_str!("../migrations/002_create_documents.sql"),
	),
];

/// Run all database migrations.
///
/// Migrations are idempotent - safe to run on every start.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
	for (name, sql) in MIGRATIONS {
		for stmt in statements(sql) {
			sqlx::query(stmt).execute(pool).await?;
		}
		tracing::debug!(migration = *name, "migration applied");
	}
	Ok(())
}

fn statements(sql: &str) -> impl Iterator<Item = &str> {
	sql.split(';').filter(|s| {
		s.lines()
			.map(str::trim)
			.any(|line| !line.is_empty() && !line.starts_with("--"))
	})
}
