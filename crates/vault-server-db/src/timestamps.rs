// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::DbError;

/// RFC3339 with fixed microsecond precision so TEXT columns sort chronologically.
pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
	at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>, DbError> {
	DateTime::parse_from_rfc3339(value)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("Invalid {column}: {e}")))
}

pub(crate) fn parse_optional_timestamp(
	value: Option<&str>,
	column: &str,
) -> Result<Option<DateTime<Utc>>, DbError> {
	value.map(|v| parse_timestamp(v, column)).transpose()
}
