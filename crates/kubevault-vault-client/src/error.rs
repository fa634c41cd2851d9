// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the Vault client.

use thiserror::Error;

use crate::backend::BackendError;
use crate::SecretScope;

/// Result type for Vault client operations.
pub type VaultClientResult<T> = Result<T, VaultClientError>;

/// Errors surfaced by the credential manager and secret reader.
///
/// Every variant is terminal for the call that produced it; nothing here is
/// retried internally.
#[derive(Debug, Error)]
pub enum VaultClientError {
	// =========================================================================
	// Setup
	// =========================================================================
	#[error("configuration error: {0}")]
	Configuration(String),

	// =========================================================================
	// Authentication
	// =========================================================================
	/// The service-account JWT could not be read.
	#[error("failed to read service account token from {location}: {source}")]
	TokenUnavailable {
		location: String,
		#[source]
		source: std::io::Error,
	},

	/// The login call failed at the transport level or Vault rejected it.
	#[error("failed to authenticate with vault as role {role}: {source}")]
	AuthExchangeFailed {
		role: String,
		#[source]
		source: BackendError,
	},

	/// The login call succeeded but carried no usable client token.
	#[error("invalid auth response from vault: {0}")]
	AuthResponseInvalid(String),

	// =========================================================================
	// Secret access
	// =========================================================================
	#[error("failed to read {scope} secret at {path}: {source}")]
	ReadFailed {
		scope: SecretScope,
		path: String,
		#[source]
		source: BackendError,
	},

	#[error("{scope} secret not found at {path}")]
	SecretNotFound { scope: SecretScope, path: String },

	#[error("invalid secret format at {path}: {reason}")]
	InvalidSecretFormat { path: String, reason: String },
}

impl VaultClientError {
	/// Stable machine-readable identifier, used in HTTP error bodies.
	pub fn code(&self) -> &'static str {
		match self {
			VaultClientError::Configuration(_) => "config_error",
			VaultClientError::TokenUnavailable { .. } => "token_unavailable",
			VaultClientError::AuthExchangeFailed { .. } => "auth_exchange_failed",
			VaultClientError::AuthResponseInvalid(_) => "auth_response_invalid",
			VaultClientError::ReadFailed { .. } => "read_failed",
			VaultClientError::SecretNotFound { .. } => "secret_not_found",
			VaultClientError::InvalidSecretFormat { .. } => "invalid_secret_format",
		}
	}

	/// Returns true if this error points at our side or the backend rather
	/// than at the requested secret, and should be logged at error level.
	pub fn is_internal(&self) -> bool {
		!matches!(
			self,
			VaultClientError::SecretNotFound { .. } | VaultClientError::InvalidSecretFormat { .. }
		)
	}
}
