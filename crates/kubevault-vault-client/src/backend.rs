// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The narrow slice of the Vault API the client depends on.

use async_trait::async_trait;
use kubevault_common_secret::SecretString;
use serde_json::Value;
use thiserror::Error;

/// Failures reported by a [`VaultBackend`].
#[derive(Debug, Error)]
pub enum BackendError {
	/// The request never produced a response (connect, TLS, timeout).
	#[error("HTTP error: {0}")]
	Http(#[from] reqwest::Error),

	/// Vault answered with a non-success status.
	#[error("vault returned HTTP {status}: {}", display_errors(.errors))]
	Status { status: u16, errors: Vec<String> },

	/// Vault answered successfully but the body was not what the endpoint
	/// documents.
	#[error("invalid response: {0}")]
	Decode(String),

	/// The path cannot be sent without the URL parser rewriting it, so no
	/// request was made.
	#[error("invalid path {path:?}: {reason}")]
	InvalidPath { path: String, reason: String },
}

fn display_errors(errors: &[String]) -> String {
	if errors.is_empty() {
		"no error detail".to_string()
	} else {
		errors.join("; ")
	}
}

/// Auth block of a successful Kubernetes login.
#[derive(Debug, Clone)]
pub struct LoginAuth {
	pub client_token: SecretString,
	pub accessor: Option<String>,
	pub policies: Vec<String>,
	pub lease_duration: u64,
	pub renewable: bool,
}

/// Operations the credential manager performs against Vault.
///
/// This abstraction keeps the HTTP client private to the backend and lets the
/// authentication state machine run against a fake in tests.
#[async_trait]
pub trait VaultBackend: Send + Sync {
	/// Self-lookup on `token`. `Ok(())` means Vault still recognises it.
	async fn lookup_self(&self, token: &SecretString) -> Result<(), BackendError>;

	/// Exchange a service-account JWT for a Vault token.
	///
	/// `Ok(None)` means Vault answered successfully without an `auth` block.
	async fn kubernetes_login(
		&self,
		role: &str,
		jwt: &SecretString,
	) -> Result<Option<LoginAuth>, BackendError>;

	/// Logical read of `path` (relative to `/v1/`).
	///
	/// `Ok(None)` means Vault has nothing at that path. `Ok(Some(_))` is the raw
	/// response body; interpreting it is the caller's job.
	async fn read(
		&self,
		token: Option<&SecretString>,
		path: &str,
	) -> Result<Option<Value>, BackendError>;
}
