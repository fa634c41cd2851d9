// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Vault client for workloads running in Kubernetes.
//!
//! This crate lets a pod:
//! 1. Log in to Vault's Kubernetes auth method with its service-account JWT
//! 2. Keep that Vault token valid, logging in again when a self-lookup fails
//! 3. Read KV v2 secrets from the cluster or application secret engines
//!
//! # Example
//!
//! ```ignore
//! use kubevault_vault_client::{SecretScope, VaultClient, VaultConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = VaultClient::connect(VaultConfig::default()).await?;
//!
//!     let creds = client.read_secret(SecretScope::Cluster, "db/creds").await?;
//!     println!("keys: {:?}", creds.keys().collect::<Vec<_>>());
//!
//!     Ok(())
//! }
//! ```

mod backend;
mod client;
mod config;
mod credentials;
mod error;
mod http;
#[cfg(any(test, feature = "testing"))]
mod mock;
mod reader;
mod token_source;

use std::fmt;

pub use backend::{BackendError, LoginAuth, VaultBackend};
pub use client::VaultClient;
pub use config::{
	VaultConfig, DEFAULT_AUTH_MOUNT, DEFAULT_ROLE_NAME, DEFAULT_TIMEOUT, DEFAULT_VAULT_ADDR,
	SA_TOKEN_PATH,
};
pub use credentials::{CredentialManager, SessionState};
pub use error::{VaultClientError, VaultClientResult};
pub use http::HttpVaultBackend;
#[cfg(any(test, feature = "testing"))]
pub use mock::MockVaultBackend;
pub use reader::{extract_secret_data, SecretData, SecretReader};
pub use token_source::{FileTokenSource, IdentityTokenSource, StaticTokenSource};

pub use kubevault_common_secret::SecretString;

/// Which secret engine a read targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecretScope {
	/// Secrets shared by everything in the cluster.
	Cluster,
	/// Secrets owned by this application.
	Application,
}

impl SecretScope {
	/// KV v2 data prefix for this scope.
	pub fn path_prefix(&self) -> &'static str {
		match self {
			SecretScope::Cluster => "cluster-secrets/data/",
			SecretScope::Application => "app-secrets/data/",
		}
	}

	/// Full logical path for `path` in this scope. `path` is not altered.
	pub fn secret_path(&self, path: &str) -> String {
		format!("{}{}", self.path_prefix(), path)
	}
}

impl fmt::Display for SecretScope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			SecretScope::Cluster => "cluster",
			SecretScope::Application => "application",
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn scope_paths() {
		assert_eq!(
			SecretScope::Cluster.secret_path("db/creds"),
			"cluster-secrets/data/db/creds"
		);
		assert_eq!(
			SecretScope::Application.secret_path("api-key"),
			"app-secrets/data/api-key"
		);
	}

	#[test]
	fn empty_path_is_passed_through() {
		assert_eq!(SecretScope::Cluster.secret_path(""), "cluster-secrets/data/");
	}

	proptest! {
		#[test]
		fn secret_path_is_prefix_plus_path(path in "[a-zA-Z0-9_./-]{1,40}") {
			for scope in [SecretScope::Cluster, SecretScope::Application] {
				let full = scope.secret_path(&path);
				prop_assert!(full.starts_with(scope.path_prefix()));
				prop_assert_eq!(&full[scope.path_prefix().len()..], path.as_str());
			}
		}
	}
}
