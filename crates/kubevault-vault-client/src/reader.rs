// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! KV v2 secret reads.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::credentials::CredentialManager;
use crate::error::{VaultClientError, VaultClientResult};
use crate::SecretScope;

/// Key/value payload of a secret, passed through exactly as Vault stored it.
pub type SecretData = Map<String, Value>;

/// Reads secrets through a [`CredentialManager`]'s backend and token.
///
/// Stateless: no caching, and no authentication of its own. Callers run
/// [`CredentialManager::ensure_authenticated`] first.
#[derive(Debug, Clone)]
pub struct SecretReader {
	credentials: Arc<CredentialManager>,
}

impl SecretReader {
	pub fn new(credentials: Arc<CredentialManager>) -> Self {
		Self { credentials }
	}

	/// Fetch the latest version of `path` in `scope`.
	///
	/// `path` is sent verbatim, percent-encoded per segment. A `.` or `..`
	/// segment fails with [`VaultClientError::ReadFailed`] before any request
	/// is made, so a read never leaves its scope.
	#[instrument(skip(self), fields(scope = %scope))]
	pub async fn read_secret(&self, scope: SecretScope, path: &str) -> VaultClientResult<SecretData> {
		let address = scope.secret_path(path);
		debug!(address = %address, "reading secret");

		let envelope = self
			.credentials
			.read(&address)
			.await
			.map_err(|source| VaultClientError::ReadFailed {
				scope,
				path: address.clone(),
				source,
			})?;

		extract_secret_data(scope, &address, envelope)
	}
}

/// Unwrap the KV v2 envelope `{"data": {"data": {...}, "metadata": {...}}}`.
///
/// A missing or null envelope, outer `data`, or inner `data` means there is no
/// live version (deleted versions keep metadata but null out `data.data`).
/// Anything present but not an object is a format error.
pub fn extract_secret_data(
	scope: SecretScope,
	address: &str,
	envelope: Option<Value>,
) -> VaultClientResult<SecretData> {
	let not_found = || VaultClientError::SecretNotFound {
		scope,
		path: address.to_string(),
	};
	let invalid = |reason: &str| VaultClientError::InvalidSecretFormat {
		path: address.to_string(),
		reason: reason.to_string(),
	};

	let mut envelope = match envelope {
		None | Some(Value::Null) => return Err(not_found()),
		Some(Value::Object(envelope)) => envelope,
		Some(_) => return Err(invalid("response body is not an object")),
	};

	let mut version = match envelope.remove("data") {
		None | Some(Value::Null) => return Err(not_found()),
		Some(Value::Object(version)) => version,
		Some(_) => return Err(invalid("\"data\" is not an object")),
	};

	match version.remove("data") {
		None | Some(Value::Null) => Err(not_found()),
		Some(Value::Object(data)) => Ok(data),
		Some(_) => Err(invalid("\"data.data\" is not a key/value map")),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::mock::MockVaultBackend;
	use crate::token_source::StaticTokenSource;
	use serde_json::json;

	const ADDR: &str = "cluster-secrets/data/db/creds";

	fn extract(envelope: Value) -> VaultClientResult<SecretData> {
		extract_secret_data(SecretScope::Cluster, ADDR, Some(envelope))
	}

	#[test]
	fn returns_inner_map_unchanged() {
		let data = extract(json!({
			"data": {
				"data": {"user": "a", "pass": "b"},
				"metadata": {"version": 3}
			}
		}))
		.unwrap();

		assert_eq!(Value::Object(data), json!({"user": "a", "pass": "b"}));
	}

	#[test]
	fn nested_values_pass_through_opaquely() {
		let data = extract(json!({"data": {"data": {"port": 5432, "tls": {"on": true}, "hosts": ["a", "b"]}}}))
			.unwrap();
		assert_eq!(data["port"], json!(5432));
		assert_eq!(data["tls"], json!({"on": true}));
		assert_eq!(data["hosts"], json!(["a", "b"]));
	}

	#[test]
	fn missing_or_null_data_is_not_found() {
		for envelope in [
			json!({}),
			json!({"data": null}),
			json!({"data": {"metadata": {"version": 1}}}),
			json!({"data": {"data": null, "metadata": {"deletion_time": "2025-01-01T00:00:00Z"}}}),
		] {
			let err = extract(envelope.clone()).unwrap_err();
			assert!(
				matches!(err, VaultClientError::SecretNotFound { .. }),
				"{envelope} gave {err:?}"
			);
		}

		let err = extract_secret_data(SecretScope::Cluster, ADDR, None).unwrap_err();
		assert!(matches!(err, VaultClientError::SecretNotFound { .. }));
	}

	#[test]
	fn non_map_data_is_invalid_format() {
		for envelope in [
			json!({"data": {"data": "plain-string"}}),
			json!({"data": {"data": 42}}),
			json!({"data": {"data": ["a", "b"]}}),
			json!({"data": "not-an-object"}),
			json!(["not", "an", "envelope"]),
		] {
			let err = extract(envelope.clone()).unwrap_err();
			assert!(
				matches!(err, VaultClientError::InvalidSecretFormat { .. }),
				"{envelope} gave {err:?}"
			);
		}
	}

	#[test]
	fn empty_map_is_a_valid_secret() {
		let data = extract(json!({"data": {"data": {}}})).unwrap();
		assert!(data.is_empty());
	}

	fn reader(backend: &Arc<MockVaultBackend>) -> (Arc<CredentialManager>, SecretReader) {
		let credentials = Arc::new(CredentialManager::new(
			backend.clone(),
			Arc::new(StaticTokenSource::new("jwt")),
			"app-role",
		));
		(credentials.clone(), SecretReader::new(credentials))
	}

	#[tokio::test]
	async fn reads_scoped_address_with_attached_token() {
		let backend = Arc::new(MockVaultBackend::new());
		backend.insert_response(
			"app-secrets/data/api-key",
			json!({"data": {"data": {"key": "k-123"}}}),
		);
		let (credentials, reader) = reader(&backend);
		credentials.ensure_authenticated().await.unwrap();

		let data = reader.read_secret(SecretScope::Application, "api-key").await.unwrap();

		assert_eq!(data["key"], json!("k-123"));
		assert_eq!(
			backend.reads(),
			vec![(
				"app-secrets/data/api-key".to_string(),
				Some("hvs.mock-1".to_string())
			)]
		);
	}

	#[tokio::test]
	async fn absent_secret_is_not_found() {
		let backend = Arc::new(MockVaultBackend::new());
		let (_, reader) = reader(&backend);

		let err = reader.read_secret(SecretScope::Cluster, "missing").await.unwrap_err();
		assert!(matches!(err, VaultClientError::SecretNotFound { .. }));
		assert!(err.to_string().contains("not found"));
	}

	#[tokio::test]
	async fn backend_failure_is_read_failed() {
		let backend = Arc::new(MockVaultBackend::new());
		backend.fail_reads(500);
		let (_, reader) = reader(&backend);

		let err = reader.read_secret(SecretScope::Cluster, "db").await.unwrap_err();
		match err {
			VaultClientError::ReadFailed { scope, path, .. } => {
				assert_eq!(scope, SecretScope::Cluster);
				assert_eq!(path, "cluster-secrets/data/db");
			}
			other => panic!("expected ReadFailed, got {other:?}"),
		}
	}

	#[tokio::test]
	async fn every_read_goes_to_the_backend() {
		let backend = Arc::new(MockVaultBackend::new());
		backend.insert_response("cluster-secrets/data/db", json!({"data": {"data": {"u": "x"}}}));
		let (_, reader) = reader(&backend);

		reader.read_secret(SecretScope::Cluster, "db").await.unwrap();
		reader.read_secret(SecretScope::Cluster, "db").await.unwrap();

		assert_eq!(backend.reads().len(), 2);
	}
}
