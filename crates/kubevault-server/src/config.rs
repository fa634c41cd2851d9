// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Process configuration, read once from the environment at startup.
//!
//! | Variable | Default |
//! |---|---|
//! | `VAULT_ADDR` | `http://vault.vault:8200` |
//! | `VAULT_ROLE_NAME` | `app-role` |
//! | `VAULT_NAMESPACE` | unset |
//! | `VAULT_K8S_AUTH_MOUNT` | `kubernetes` |
//! | `VAULT_K8S_TOKEN_PATH` | service-account token mount |
//! | `VAULT_CLIENT_TIMEOUT` | `60` (seconds) |
//! | `VAULT_TOKEN` / `VAULT_TOKEN_FILE` | unset |
//! | `KUBEVAULT_LISTEN_ADDR` | `0.0.0.0:3000` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use kubevault_common_config::{
	env_optional, env_or_default, env_parse_or_default, load_secret_env, EnvError,
};
use kubevault_vault_client::{
	VaultConfig, DEFAULT_AUTH_MOUNT, DEFAULT_ROLE_NAME, DEFAULT_TIMEOUT, DEFAULT_VAULT_ADDR,
	SA_TOKEN_PATH,
};
use thiserror::Error;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error(transparent)]
	Env(#[from] EnvError),

	#[error("invalid value for {name}: {message}")]
	InvalidValue { name: String, message: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone)]
pub struct ServerConfig {
	pub listen_addr: SocketAddr,
	pub vault: VaultConfig,
}

impl ServerConfig {
	pub fn from_env() -> Result<Self> {
		let listen_addr = env_parse_or_default(
			"KUBEVAULT_LISTEN_ADDR",
			default_listen_addr(),
		)?;

		let timeout_secs: u64 = env_parse_or_default("VAULT_CLIENT_TIMEOUT", DEFAULT_TIMEOUT.as_secs())?;
		if timeout_secs == 0 {
			return Err(ConfigError::InvalidValue {
				name: "VAULT_CLIENT_TIMEOUT".into(),
				message: "must be at least 1 second".into(),
			});
		}

		let vault = VaultConfig {
			addr: env_or_default("VAULT_ADDR", DEFAULT_VAULT_ADDR),
			role_name: env_or_default("VAULT_ROLE_NAME", DEFAULT_ROLE_NAME),
			namespace: env_optional("VAULT_NAMESPACE"),
			auth_mount: env_or_default("VAULT_K8S_AUTH_MOUNT", DEFAULT_AUTH_MOUNT),
			token_path: PathBuf::from(env_or_default("VAULT_K8S_TOKEN_PATH", SA_TOKEN_PATH)),
			timeout: Duration::from_secs(timeout_secs),
			session_token: load_secret_env("VAULT_TOKEN")?,
		};

		Ok(Self { listen_addr, vault })
	}
}

fn default_listen_addr() -> SocketAddr {
	SocketAddr::from(([0, 0, 0, 0], 3000))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::env;

	const VARS: &[&str] = &[
		"KUBEVAULT_LISTEN_ADDR",
		"VAULT_CLIENT_TIMEOUT",
		"VAULT_ADDR",
		"VAULT_ROLE_NAME",
		"VAULT_NAMESPACE",
		"VAULT_K8S_AUTH_MOUNT",
		"VAULT_K8S_TOKEN_PATH",
		"VAULT_TOKEN",
		"VAULT_TOKEN_FILE",
	];

	fn clear() {
		for var in VARS {
			env::remove_var(var);
		}
	}

	#[test]
	fn default_listen_addr_matches_constant() {
		assert_eq!(default_listen_addr().to_string(), DEFAULT_LISTEN_ADDR);
	}

	// Everything that touches the real variable names lives in one test so it
	// cannot race with itself.
	#[test]
	fn from_env_defaults_and_overrides() {
		clear();
		let config = ServerConfig::from_env().unwrap();
		assert_eq!(config.listen_addr.to_string(), DEFAULT_LISTEN_ADDR);
		assert_eq!(config.vault.addr, "http://vault.vault:8200");
		assert_eq!(config.vault.role_name, "app-role");
		assert_eq!(config.vault.timeout, Duration::from_secs(60));
		assert!(config.vault.namespace.is_none());
		assert!(config.vault.session_token.is_none());

		env::set_var("VAULT_ADDR", "https://vault.example:8200");
		env::set_var("VAULT_ROLE_NAME", "payments");
		env::set_var("VAULT_NAMESPACE", "team-a");
		env::set_var("VAULT_TOKEN", "hvs.seed");
		env::set_var("KUBEVAULT_LISTEN_ADDR", "127.0.0.1:8080");
		let config = ServerConfig::from_env().unwrap();
		assert_eq!(config.vault.addr, "https://vault.example:8200");
		assert_eq!(config.vault.role_name, "payments");
		assert_eq!(config.vault.namespace.as_deref(), Some("team-a"));
		assert_eq!(config.vault.session_token.unwrap().expose(), "hvs.seed");
		assert_eq!(config.listen_addr.port(), 8080);

		env::set_var("VAULT_ROLE_NAME", "");
		assert_eq!(ServerConfig::from_env().unwrap().vault.role_name, "app-role");

		env::set_var("VAULT_CLIENT_TIMEOUT", "0");
		assert!(matches!(
			ServerConfig::from_env().unwrap_err(),
			ConfigError::InvalidValue { .. }
		));

		env::set_var("VAULT_CLIENT_TIMEOUT", "soon");
		assert!(matches!(
			ServerConfig::from_env().unwrap_err(),
			ConfigError::Env(EnvError::InvalidValue { .. })
		));

		clear();
	}
}
