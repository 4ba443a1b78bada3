// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bearer access tokens.
//!
//! Tokens are shown once at creation and stored as a SHA-256 hex digest.

/// Number of random bytes in an access token (produces 64 hex chars).
pub const ACCESS_TOKEN_BYTES: usize = 32;

/// Prefix for all Vault access tokens.
pub const ACCESS_TOKEN_PREFIX: &str = "vt_";

/// Generate a new access token.
///
/// Returns `(plaintext, hash)`. Only the hash may be persisted.
pub fn generate_access_token() -> (String, String) {
	use rand::Rng;
	let mut rng = rand::thread_rng();
	let bytes: [u8; ACCESS_TOKEN_BYTES] = rng.gen();
	let token = format!("{}{}", ACCESS_TOKEN_PREFIX, hex::encode(bytes));
	let hash = hash_token(&token);
	(token, hash)
}

/// Hash a token using SHA-256.
///
/// This must match the hash used by the auth layer for lookup.
pub fn hash_token(token: &str) -> String {
	use sha2::{Digest, Sha256};
	let mut hasher = Sha256::new();
	hasher.update(token.as_bytes());
	hex::encode(hasher.finalize())
}

/// Check if a token carries the access token prefix.
pub fn is_access_token(token: &str) -> bool {
	token.starts_with(ACCESS_TOKEN_PREFIX)
}
