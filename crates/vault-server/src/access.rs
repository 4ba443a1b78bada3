// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Route-level permission checks.
//!
//! [`RequirePermission`] runs after [`crate::auth_middleware::auth_layer`] and
//! refuses requests whose user lacks a [`Permission`]. Denials are written
//! straight onto a [`BufferedChannel`] by the error responder, so a 403 never
//! reaches a handler.
//!
//! ```ignore
//! Router::new()
//!     .route("/documents/upload", post(upload_documents))
//!     .route_layer(RequirePermission::new(Permission::DocumentCreate))
//! ```

use axum::{
	body::Body,
	http::{Request, StatusCode},
	response::{IntoResponse, Response},
};
use pin_project_lite::pin_project;
use std::{
	future::Future,
	pin::Pin,
	task::{Context, Poll},
};
use tower::{Layer, Service};
use vault_server_api::{handle_error_response, ApiFailure, BufferedChannel};
use vault_server_auth::{AuthContext, Permission};

use crate::error::ServerError;

/// Route layer that checks the current user holds a permission.
///
/// # Security
///
/// - Rejects unauthenticated requests with 401
/// - Rejects users without the permission with 403
/// - Logs every denial with user_id and permission
#[derive(Debug, Clone, Copy)]
pub struct RequirePermission {
	permission: Permission,
}

impl RequirePermission {
	pub fn new(permission: Permission) -> Self {
		Self { permission }
	}
}

impl<S> Layer<S> for RequirePermission {
	type Service = RequirePermissionService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		RequirePermissionService {
			inner,
			permission: self.permission,
		}
	}
}

/// Service wrapper for [`RequirePermission`] layer.
#[derive(Clone)]
pub struct RequirePermissionService<S> {
	inner: S,
	permission: Permission,
}

impl<S> Service<Request<Body>> for RequirePermissionService<S>
where
	S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
	S::Future: Send,
{
	type Response = Response;
	type Error = S::Error;
	type Future = RequirePermissionFuture<S::Future>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, req: Request<Body>) -> Self::Future {
		let path = req.uri().path().to_string();
		let auth_ctx = req
			.extensions()
			.get::<AuthContext>()
			.cloned()
			.unwrap_or_else(AuthContext::unauthenticated);

		let current_user = match auth_ctx.require_user() {
			Ok(user) => user,
			Err(required) => {
				tracing::debug!(permission = %self.permission, "permission denied: not authenticated");
				return RequirePermissionFuture::Rejected {
					resp: Some(ServerError::Unauthorized(required).into_envelope(&path).into_response()),
				};
			}
		};

		if !current_user.has_permission(self.permission) {
			tracing::info!(
				user_id = %current_user.user_id(),
				role = %current_user.user.role,
				permission = %self.permission,
				"permission denied"
			);
			let failure = ApiFailure::access_denied(format!("missing {}", self.permission));
			return RequirePermissionFuture::Rejected {
				resp: Some(forbidden_response(&path, &failure)),
			};
		}

		tracing::debug!(
			user_id = %current_user.user_id(),
			permission = %self.permission,
			"permission granted"
		);

		RequirePermissionFuture::Inner {
			fut: self.inner.call(req),
		}
	}
}

/// Write the denial through the error responder.
fn forbidden_response(path: &str, failure: &ApiFailure) -> Response {
	let mut channel = BufferedChannel::new();
	match handle_error_response(&mut channel, path, failure) {
		Ok(true) => channel.into_response(),
		Ok(false) => StatusCode::FORBIDDEN.into_response(),
		Err(e) => {
			tracing::error!(error = %e, path = %path, "failed to write access denied response");
			StatusCode::INTERNAL_SERVER_ERROR.into_response()
		}
	}
}

pin_project! {
	/// Future for [`RequirePermissionService`].
	#[project = RequirePermissionFutureProj]
	pub enum RequirePermissionFuture<F> {
		Inner { #[pin] fut: F },
		Rejected { resp: Option<Response> },
	}
}

impl<F, E> Future for RequirePermissionFuture<F>
where
	F: Future<Output = Result<Response, E>>,
{
	type Output = Result<Response, E>;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		match self.project() {
			RequirePermissionFutureProj::Inner { fut } => fut.poll(cx),
			RequirePermissionFutureProj::Rejected { resp } => Poll::Ready(Ok(resp
				.take()
				.unwrap_or_else(|| StatusCode::INTERNAL_SERVER_ERROR.into_response()))),
		}
	}
}
