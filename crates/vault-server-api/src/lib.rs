// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wire contract of the Vault server.
//!
//! Success bodies are built with [`build_success`]; failures go through
//! [`classify`] and either the handler error path or, when a request is stopped
//! before a handler runs, [`handle_error_response`].

pub mod documents;
pub mod envelope;
pub mod failure;
pub mod health;
pub mod responder;

pub use documents::{
	DocumentPage, DocumentResponse, UpdateDocumentRequest, DOCUMENTS_KEY, DOCUMENTS_RETRIEVED,
	DOCUMENTS_UPLOADED, DOCUMENT_RETRIEVED, DOCUMENT_UPDATED,
};
pub use envelope::{
	build_error, build_success, build_success_at, payload, status_name, timestamp_now,
	ApiResponse, Payload,
};
pub use failure::{classify, root_cause_message, ApiFailure, ErrorCategory};
pub use health::{HealthComponent, HealthResponse, HealthStatus, HEALTH_KEY, SERVICE_HEALTHY};
pub use responder::{
	handle_error_response, respond_directly, BufferedChannel, ChannelError, ResponderError,
	ResponseChannel,
};
