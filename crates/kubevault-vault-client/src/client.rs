// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client entry point: authenticate, then read.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::config::VaultConfig;
use crate::credentials::CredentialManager;
use crate::error::VaultClientResult;
use crate::http::HttpVaultBackend;
use crate::reader::{SecretData, SecretReader};
use crate::token_source::FileTokenSource;
use crate::SecretScope;

/// Vault client for a workload authenticating with its service account.
///
/// Cheap to clone; clones share the same session token.
#[derive(Debug, Clone)]
pub struct VaultClient {
	credentials: Arc<CredentialManager>,
	reader: SecretReader,
}

impl VaultClient {
	pub fn new(credentials: CredentialManager) -> Self {
		let credentials = Arc::new(credentials);
		Self {
			reader: SecretReader::new(credentials.clone()),
			credentials,
		}
	}

	/// Build an HTTP-backed client from `config` and authenticate once.
	///
	/// Fails if the first authentication fails, so a workload that cannot reach
	/// Vault or read its service-account token never starts serving.
	pub async fn connect(config: VaultConfig) -> VaultClientResult<Self> {
		let backend = HttpVaultBackend::new(&config)?;
		let mut credentials = CredentialManager::new(
			Arc::new(backend),
			Arc::new(FileTokenSource::new(config.token_path.clone())),
			config.role_name.clone(),
		);
		if let Some(token) = config.session_token {
			credentials = credentials.with_session_token(token);
		}

		let client = Self::new(credentials);
		client.credentials.ensure_authenticated().await?;
		info!(addr = %config.addr, role = %config.role_name, "connected to vault");
		Ok(client)
	}

	pub fn credentials(&self) -> &CredentialManager {
		&self.credentials
	}

	/// Ensure the session is valid, then read `path` in `scope`.
	#[instrument(skip(self), fields(scope = %scope))]
	pub async fn read_secret(&self, scope: SecretScope, path: &str) -> VaultClientResult<SecretData> {
		self.credentials.ensure_authenticated().await?;
		self.reader.read_secret(scope, path).await
	}

	pub async fn get_cluster_secret(&self, path: &str) -> VaultClientResult<SecretData> {
		self.read_secret(SecretScope::Cluster, path).await
	}

	pub async fn get_app_secret(&self, path: &str) -> VaultClientResult<SecretData> {
		self.read_secret(SecretScope::Application, path).await
	}
}
