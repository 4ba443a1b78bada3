// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Vault document metadata server.
//!
//! This crate provides an HTTP server that stores uploaded documents on disk
//! and their metadata in SQLite, stamping every write with the acting user.

pub mod access;
pub mod api;
pub mod api_docs;
pub mod auth_middleware;
pub mod document_service;
pub mod error;
pub mod pagination;
pub mod routes;
pub mod storage;
pub mod version;

pub use api::{create_app_state, create_router, AppState};
pub use api_docs::ApiDoc;
pub use document_service::{DocumentService, UploadedFile};
pub use error::ServerError;
pub use storage::FileStore;
pub use vault_server_config::ServerConfig;
