// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication middleware for Axum.
//!
//! This module provides middleware and extractors for authenticating requests
//! via bearer access tokens.
//!
//! # Security Properties
//!
//! - **Token Protection**: Tokens are hashed with SHA-256 before database lookup;
//!   raw tokens are never stored or logged.
//! - **Account Checks**: Locked, disabled and expired accounts are rejected on
//!   every request, and the reason is carried in the [`AuthContext`].
//! - **Dev Mode Bypass**: In development mode (`VAULT_SERVER_AUTH_DEV_MODE=1`),
//!   requests without valid credentials are authenticated as the dev user. This
//!   MUST NOT be enabled in production.
//!
//! # Usage
//!
//! ```ignore
//! let app = Router::new()
//!     .route("/documents", get(list_documents))
//!     .layer(from_fn_with_state(state.clone(), require_auth_layer))
//!     .layer(from_fn_with_state(state.clone(), auth_layer));
//! ```
//!
//! Handlers then take [`RequireAuth`] to get the [`CurrentUser`].

use axum::{
	body::Body,
	extract::{FromRequestParts, State},
	http::{request::Parts, Request},
	middleware::Next,
	response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::instrument;
use vault_server_api::ApiResponse;
use vault_server_auth::{extract_bearer_token, hash_token, AuthContext, CredentialFailure, CurrentUser};
use vault_server_db::UserStore;

use crate::{api::AppState, error::ServerError};

/// Authentication middleware that stores an [`AuthContext`] on every request.
///
/// Never rejects on its own; [`require_auth_layer`] and the permission layers
/// decide what an unauthenticated or rejected context means.
#[instrument(
	name = "auth_layer",
	skip(state, request, next),
	fields(
		auth_method = tracing::field::Empty,
		user_id = tracing::field::Empty,
	)
)]
pub async fn auth_layer(
	State(state): State<AppState>,
	mut request: Request<Body>,
	next: Next,
) -> Response {
	let span = tracing::Span::current();
	let mut auth_ctx = AuthContext::unauthenticated();

	if let Some(bearer_token) = extract_bearer_token(request.headers()) {
		auth_ctx = authenticate_access_token(&bearer_token, state.users.as_ref()).await;
		if let Some(user) = auth_ctx.user() {
			span.record("auth_method", "access_token");
			span.record("user_id", tracing::field::display(user.user_id()));
		}
	}

	if !auth_ctx.is_authenticated() && state.auth_config.dev_mode {
		if let Some(ref dev_user) = state.dev_user {
			span.record("auth_method", "dev_mode");
			span.record("user_id", tracing::field::display(dev_user.id));
			tracing::warn!("DEV MODE AUTHENTICATION ENABLED - DO NOT USE IN PRODUCTION");
			auth_ctx = AuthContext::authenticated(CurrentUser::from_dev_mode(dev_user.clone()));
		}
	}

	if !auth_ctx.is_authenticated() {
		span.record("auth_method", "none");
	}

	request.extensions_mut().insert(auth_ctx);
	next.run(request).await
}

/// Authenticate via bearer access token.
///
/// # Security
///
/// - Token is hashed before database lookup
/// - Account flags are checked before the user is accepted
/// - Last-login is recorded with the user as actor
#[instrument(skip(token, users))]
async fn authenticate_access_token(token: &str, users: &dyn UserStore) -> AuthContext {
	let token_hash = hash_token(token);

	let record = match users.get_user_by_token_hash(&token_hash).await {
		Ok(Some(record)) => record,
		Ok(None) => {
			tracing::debug!("access token not found");
			return AuthContext::rejected(CredentialFailure::BadCredentials);
		}
		Err(e) => {
			tracing::error!(error = %e, "failed to look up access token");
			return AuthContext::unauthenticated();
		}
	};

	if let Err(reason) = record.user.check_account_status() {
		tracing::info!(user_id = %record.user.id, reason = %reason, "account may not authenticate");
		return AuthContext::rejected(reason);
	}

	let now = Utc::now();
	let mut user = record.user;
	match users.record_login(user.id, now).await {
		Ok(()) => user.last_login = Some(now),
		Err(e) => tracing::warn!(user_id = %user.id, error = %e, "failed to record login"),
	}

	AuthContext::authenticated(CurrentUser::from_access_token(user))
}

/// Middleware that answers 401 for requests without an authenticated user.
#[instrument(
	name = "require_auth_layer",
	skip(request, next),
	fields(authenticated = tracing::field::Empty)
)]
pub async fn require_auth_layer(request: Request<Body>, next: Next) -> Response {
	let auth_ctx = request
		.extensions()
		.get::<AuthContext>()
		.cloned()
		.unwrap_or_else(AuthContext::unauthenticated);

	if let Err(required) = auth_ctx.require_user() {
		tracing::Span::current().record("authenticated", false);
		return ServerError::Unauthorized(required)
			.into_envelope(request.uri().path())
			.into_response();
	}

	tracing::Span::current().record("authenticated", true);
	next.run(request).await
}

/// Extractor for the authenticated user. Rejects with a 401 envelope.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
	S: Send + Sync,
{
	type Rejection = ApiResponse;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let auth_ctx = parts
			.extensions
			.get::<AuthContext>()
			.cloned()
			.unwrap_or_else(AuthContext::unauthenticated);

		match auth_ctx.require_user() {
			Ok(user) => Ok(RequireAuth(user.clone())),
			Err(required) => Err(ServerError::Unauthorized(required).into_envelope(parts.uri.path())),
		}
	}
}
