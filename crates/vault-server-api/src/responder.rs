// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Writing error envelopes straight onto an outbound channel.
//!
//! Used when a request is rejected before any handler runs, so there is no
//! handler return value to turn into a response. The layer that rejects the
//! request owns a [`ResponseChannel`] and asks [`handle_error_response`] to fill
//! it.

use axum::body::Body;
use axum::response::Response;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, StatusCode};

use crate::envelope::build_error;
use crate::failure::{classify, root_cause_message, ApiFailure};

const APPLICATION_JSON: &str = "application/json";

/// Errors raised by a [`ResponseChannel`].
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
	#[error("response has already been committed")]
	Committed,

	#[error("invalid header value: {0}")]
	InvalidHeader(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

/// An outbound response being assembled. Once flushed it is committed and
/// refuses further changes.
pub trait ResponseChannel {
	fn set_status(&mut self, status: StatusCode) -> Result<(), ChannelError>;
	fn set_content_type(&mut self, content_type: &str) -> Result<(), ChannelError>;
	fn write(&mut self, bytes: &[u8]) -> Result<(), ChannelError>;
	fn flush(&mut self) -> Result<(), ChannelError>;
	fn is_committed(&self) -> bool;
}

/// In-memory channel that converts into an axum [`Response`].
#[derive(Debug)]
pub struct BufferedChannel {
	status: StatusCode,
	content_type: Option<HeaderValue>,
	body: Vec<u8>,
	committed: bool,
}

impl Default for BufferedChannel {
	fn default() -> Self {
		Self {
			status: StatusCode::OK,
			content_type: None,
			body: Vec::new(),
			committed: false,
		}
	}
}

impl BufferedChannel {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn status(&self) -> StatusCode {
		self.status
	}

	pub fn content_type(&self) -> Option<&HeaderValue> {
		self.content_type.as_ref()
	}

	pub fn body(&self) -> &[u8] {
		&self.body
	}

	pub fn into_response(self) -> Response {
		let mut response = Response::new(Body::from(self.body));
		*response.status_mut() = self.status;
		if let Some(content_type) = self.content_type {
			response.headers_mut().insert(CONTENT_TYPE, content_type);
		}
		response
	}

	fn ensure_open(&self) -> Result<(), ChannelError> {
		if self.committed {
			Err(ChannelError::Committed)
		} else {
			Ok(())
		}
	}
}

impl ResponseChannel for BufferedChannel {
	fn set_status(&mut self, status: StatusCode) -> Result<(), ChannelError> {
		self.ensure_open()?;
		self.status = status;
		Ok(())
	}

	fn set_content_type(&mut self, content_type: &str) -> Result<(), ChannelError> {
		self.ensure_open()?;
		let value = HeaderValue::from_str(content_type)
			.map_err(|_| ChannelError::InvalidHeader(content_type.to_string()))?;
		self.content_type = Some(value);
		Ok(())
	}

	fn write(&mut self, bytes: &[u8]) -> Result<(), ChannelError> {
		self.ensure_open()?;
		self.body.extend_from_slice(bytes);
		Ok(())
	}

	fn flush(&mut self) -> Result<(), ChannelError> {
		self.ensure_open()?;
		self.committed = true;
		Ok(())
	}

	fn is_committed(&self) -> bool {
		self.committed
	}
}

/// Failure of the direct-write path itself. Callers only see that it failed.
#[derive(Debug, thiserror::Error)]
pub enum ResponderError {
	#[error("response has already been committed")]
	AlreadyCommitted,

	#[error("failed to write error response")]
	Internal(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl From<ChannelError> for ResponderError {
	fn from(err: ChannelError) -> Self {
		ResponderError::Internal(Box::new(err))
	}
}

impl From<serde_json::Error> for ResponderError {
	fn from(err: serde_json::Error) -> Self {
		ResponderError::Internal(Box::new(err))
	}
}

/// Serialize the error envelope for `failure` onto `channel` and commit it.
pub fn respond_directly<C>(
	channel: &mut C,
	request_path: &str,
	failure: &ApiFailure,
	status: StatusCode,
) -> Result<(), ResponderError>
where
	C: ResponseChannel + ?Sized,
{
	if channel.is_committed() {
		return Err(ResponderError::AlreadyCommitted);
	}

	channel.set_content_type(APPLICATION_JSON)?;
	channel.set_status(status)?;

	let envelope = build_error(
		request_path,
		classify(failure, status),
		root_cause_message(failure),
		status,
	);
	let bytes = serde_json::to_vec(&envelope)?;
	channel.write(&bytes)?;
	channel.flush()?;

	tracing::debug!(
		path = %request_path,
		status = status.as_u16(),
		"wrote error response directly"
	);
	Ok(())
}

/// Interception entry point. Writes a 403 envelope for access denials and
/// returns whether anything was written.
pub fn handle_error_response<C>(
	channel: &mut C,
	request_path: &str,
	failure: &ApiFailure,
) -> Result<bool, ResponderError>
where
	C: ResponseChannel + ?Sized,
{
	if !failure.is_access_denied() {
		return Ok(false);
	}
	respond_directly(channel, request_path, failure, StatusCode::FORBIDDEN)?;
	Ok(true)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::envelope::ApiResponse;
	use crate::failure::PERMISSION_DENIED_MESSAGE;
	use vault_server_auth::CredentialFailure;

	/// A channel whose writes always fail.
	struct BrokenChannel;

	impl ResponseChannel for BrokenChannel {
		fn set_status(&mut self, _: StatusCode) -> Result<(), ChannelError> {
			Ok(())
		}

		fn set_content_type(&mut self, _: &str) -> Result<(), ChannelError> {
			Ok(())
		}

		fn write(&mut self, _: &[u8]) -> Result<(), ChannelError> {
			Err(ChannelError::Io(std::io::Error::new(
				std::io::ErrorKind::BrokenPipe,
				"peer went away",
			)))
		}

		fn flush(&mut self) -> Result<(), ChannelError> {
			Ok(())
		}

		fn is_committed(&self) -> bool {
			false
		}
	}

	#[test]
	fn access_denial_is_written_and_committed() {
		let mut channel = BufferedChannel::new();
		let failure = ApiFailure::access_denied("missing document:create");

		let wrote = handle_error_response(&mut channel, "/documents/upload", &failure).unwrap();

		assert!(wrote);
		assert!(channel.is_committed());
		assert_eq!(channel.status(), StatusCode::FORBIDDEN);
		assert_eq!(
			channel.content_type().unwrap(),
			&HeaderValue::from_static("application/json")
		);

		let envelope: ApiResponse = serde_json::from_slice(channel.body()).unwrap();
		assert_eq!(envelope.status_code(), 403);
		assert_eq!(envelope.status(), "FORBIDDEN");
		assert_eq!(envelope.path(), "/documents/upload");
		assert_eq!(envelope.message(), PERMISSION_DENIED_MESSAGE);
		assert!(!envelope.exception().is_empty());
		assert!(envelope.data().is_empty());
	}

	#[test]
	fn writes_after_commit_fail() {
		let mut channel = BufferedChannel::new();
		let failure = ApiFailure::access_denied("nope");
		handle_error_response(&mut channel, "/documents", &failure).unwrap();

		assert!(matches!(channel.write(b"more"), Err(ChannelError::Committed)));
		assert!(matches!(
			respond_directly(&mut channel, "/documents", &failure, StatusCode::FORBIDDEN),
			Err(ResponderError::AlreadyCommitted)
		));
	}

	#[test]
	fn other_failures_are_left_to_the_caller() {
		let mut channel = BufferedChannel::new();
		let failure = ApiFailure::Credential(CredentialFailure::AccountLocked);

		let wrote = handle_error_response(&mut channel, "/documents", &failure).unwrap();

		assert!(!wrote);
		assert!(!channel.is_committed());
		assert!(channel.body().is_empty());
	}

	#[test]
	fn write_failure_is_opaque_internal() {
		let failure = ApiFailure::access_denied("nope");
		let err = respond_directly(&mut BrokenChannel, "/documents", &failure, StatusCode::FORBIDDEN)
			.unwrap_err();
		assert!(matches!(err, ResponderError::Internal(_)));
		assert_eq!(err.to_string(), "failed to write error response");
	}

	#[test]
	fn respond_directly_uses_the_given_status() {
		let mut channel = BufferedChannel::new();
		let failure = ApiFailure::internal("pool closed");

		respond_directly(
			&mut channel,
			"/documents",
			&failure,
			StatusCode::INTERNAL_SERVER_ERROR,
		)
		.unwrap();

		let envelope: ApiResponse = serde_json::from_slice(channel.body()).unwrap();
		assert_eq!(envelope.status(), "INTERNAL_SERVER_ERROR");
		assert_eq!(envelope.message(), "An internal server error occurred");
		assert_eq!(envelope.exception(), "InternalError: pool closed");
	}
}
