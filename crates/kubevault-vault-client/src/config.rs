// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;
use std::time::Duration;

use kubevault_common_secret::SecretString;

/// In-cluster Vault service address.
pub const DEFAULT_VAULT_ADDR: &str = "http://vault.vault:8200";

/// Role presented to the Kubernetes auth method.
pub const DEFAULT_ROLE_NAME: &str = "app-role";

/// Mount path of the Kubernetes auth method.
pub const DEFAULT_AUTH_MOUNT: &str = "kubernetes";

/// Projected service-account token inside every pod.
pub const SA_TOKEN_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";

/// Matches the Vault SDK's default client timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection and authentication settings for one Vault client.
#[derive(Debug, Clone)]
pub struct VaultConfig {
	pub addr: String,
	pub role_name: String,
	/// Sent as `X-Vault-Namespace` when set (Vault Enterprise).
	pub namespace: Option<String>,
	pub auth_mount: String,
	pub token_path: PathBuf,
	pub timeout: Duration,
	/// Token to start from instead of logging in; probed before first use.
	pub session_token: Option<SecretString>,
}

impl Default for VaultConfig {
	fn default() -> Self {
		Self {
			addr: DEFAULT_VAULT_ADDR.to_string(),
			role_name: DEFAULT_ROLE_NAME.to_string(),
			namespace: None,
			auth_mount: DEFAULT_AUTH_MOUNT.to_string(),
			token_path: PathBuf::from(SA_TOKEN_PATH),
			timeout: DEFAULT_TIMEOUT,
			session_token: None,
		}
	}
}
