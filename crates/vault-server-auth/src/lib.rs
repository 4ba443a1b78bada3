// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication and authorization for the Vault document server.
//!
//! - [`User`] accounts with a [`Role`] that grants a fixed set of [`Permission`]s
//! - [`CredentialFailure`] for accounts that exist but may not authenticate
//! - Bearer access tokens, stored only as SHA-256 hashes ([`hash_token`])
//! - [`AuthContext`], which also resolves the audit actor for writes

pub mod middleware;
pub mod token;
pub mod types;
pub mod user;

pub use middleware::{extract_bearer_token, AuthConfig, AuthContext, AuthRequired, CurrentUser};
pub use token::{generate_access_token, hash_token, is_access_token, ACCESS_TOKEN_PREFIX};
pub use types::{Permission, Role, UserId};
pub use user::{CredentialFailure, User};
