// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The uniform response envelope.
//!
//! Every body the server produces, success or failure, has this shape:
//!
//! ```json
//! {
//!   "timeStamp": "2025-01-29T10:00:00.000000",
//!   "statusCode": 201,
//!   "path": "/documents/upload",
//!   "status": "CREATED",
//!   "message": "Document(s) uploaded successfully.",
//!   "exception": "",
//!   "data": { "documents": [] }
//! }
//! ```

use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Local, NaiveDateTime};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Key/value payload carried in `data`.
pub type Payload = Map<String, Value>;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Response envelope. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
	time_stamp: String,
	status_code: u16,
	path: String,
	status: String,
	message: String,
	exception: String,
	#[cfg_attr(feature = "openapi", schema(value_type = Object))]
	data: Payload,
}

impl ApiResponse {
	pub fn time_stamp(&self) -> &str {
		&self.time_stamp
	}

	pub fn status_code(&self) -> u16 {
		self.status_code
	}

	pub fn path(&self) -> &str {
		&self.path
	}

	pub fn status(&self) -> &str {
		&self.status
	}

	pub fn message(&self) -> &str {
		&self.message
	}

	pub fn exception(&self) -> &str {
		&self.exception
	}

	pub fn data(&self) -> &Payload {
		&self.data
	}

	pub fn is_success(&self) -> bool {
		self.exception.is_empty()
	}
}

impl IntoResponse for ApiResponse {
	fn into_response(self) -> Response {
		let status =
			StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		(status, Json(self)).into_response()
	}
}

/// Build a payload map with a single entry.
pub fn payload<T: Serialize + ?Sized>(key: &str, value: &T) -> serde_json::Result<Payload> {
	let mut map = Payload::new();
	map.insert(key.to_string(), serde_json::to_value(value)?);
	Ok(map)
}

/// Wrap a successful result in the envelope, stamped with the current local time.
pub fn build_success(
	request_path: &str,
	data: Payload,
	message: impl Into<String>,
	status: StatusCode,
) -> ApiResponse {
	build_success_at(timestamp_now(), request_path, data, message, status)
}

/// Same as [`build_success`] with an explicit timestamp.
pub fn build_success_at(
	time_stamp: impl Into<String>,
	request_path: &str,
	data: Payload,
	message: impl Into<String>,
	status: StatusCode,
) -> ApiResponse {
	ApiResponse {
		time_stamp: time_stamp.into(),
		status_code: status.as_u16(),
		path: request_path.to_string(),
		status: status_name(status),
		message: message.into(),
		exception: String::new(),
		data,
	}
}

/// Envelope for a failure. `data` is always empty.
pub fn build_error(
	request_path: &str,
	message: impl Into<String>,
	exception: impl Into<String>,
	status: StatusCode,
) -> ApiResponse {
	build_error_at(timestamp_now(), request_path, message, exception, status)
}

pub fn build_error_at(
	time_stamp: impl Into<String>,
	request_path: &str,
	message: impl Into<String>,
	exception: impl Into<String>,
	status: StatusCode,
) -> ApiResponse {
	ApiResponse {
		time_stamp: time_stamp.into(),
		status_code: status.as_u16(),
		path: request_path.to_string(),
		status: status_name(status),
		message: message.into(),
		exception: exception.into(),
		data: Payload::new(),
	}
}

/// Upper-snake name of a status code's canonical reason (`201 -> "CREATED"`).
///
/// Codes without a canonical reason render as their number.
pub fn status_name(status: StatusCode) -> String {
	match status.canonical_reason() {
		Some(reason) => {
			let mut name = String::with_capacity(reason.len());
			for word in reason.split(|c: char| !c.is_ascii_alphanumeric()) {
				if word.is_empty() {
					continue;
				}
				if !name.is_empty() {
					name.push('_');
				}
				name.push_str(&word.to_ascii_uppercase());
			}
			name
		}
		None => status.as_u16().to_string(),
	}
}

/// Current local time as `YYYY-MM-DDTHH:MM:SS.ffffff`.
pub fn timestamp_now() -> String {
	format_timestamp(Local::now().naive_local())
}

pub fn format_timestamp(at: NaiveDateTime) -> String {
	at.format(TIMESTAMP_FORMAT).to_string()
}
