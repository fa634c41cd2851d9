// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP error responses.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use kubevault_vault_client::VaultClientError;
use serde::Serialize;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	/// Human-readable description, including the Vault path involved.
	pub error: String,
	/// Machine-readable kind, e.g. `secret_not_found`.
	pub code: &'static str,
}

/// Wrapper turning a client error into a response.
///
/// Every kind maps to 500; callers tell kinds apart through `code`.
#[derive(Debug)]
pub struct ApiError(pub VaultClientError);

impl From<VaultClientError> for ApiError {
	fn from(err: VaultClientError) -> Self {
		ApiError(err)
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let err = self.0;
		if err.is_internal() {
			tracing::error!(error = %err, code = err.code(), "vault request failed");
		} else {
			tracing::warn!(error = %err, code = err.code(), "secret unavailable");
		}

		(
			StatusCode::INTERNAL_SERVER_ERROR,
			Json(ErrorResponse {
				error: err.to_string(),
				code: err.code(),
			}),
		)
			.into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use kubevault_vault_client::SecretScope;

	#[test]
	fn not_found_is_500_with_code() {
		let response = ApiError(VaultClientError::SecretNotFound {
			scope: SecretScope::Application,
			path: "app-secrets/data/api-key".into(),
		})
		.into_response();
		assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
	}

	#[test]
	fn body_serializes_error_and_code() {
		let body = ErrorResponse {
			error: "cluster secret not found at cluster-secrets/data/x".into(),
			code: "secret_not_found",
		};
		let json = serde_json::to_value(&body).unwrap();
		assert_eq!(json["code"], "secret_not_found");
		assert!(json["error"].as_str().unwrap().contains("not found"));
	}
}
