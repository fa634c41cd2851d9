// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Environment variable readers.
//!
//! Unset and empty variables are treated the same way: the default applies.
//! Kubernetes manifests frequently render optional values as `""`, and a
//! blank `VAULT_ADDR` is never what the operator meant.

use std::path::PathBuf;
use std::str::FromStr;
use std::{env, fs};

use kubevault_common_secret::SecretString;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvError {
	#[error("failed to read secret file at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("secret file path in {var} is empty")]
	EmptyPath { var: String },

	#[error("invalid value for {var}: {message}")]
	InvalidValue { var: String, message: String },
}

fn non_empty(var: &str) -> Option<String> {
	env::var(var).ok().filter(|v| !v.is_empty())
}

/// Returns the value of `var` unless it is unset or empty.
pub fn env_optional(var: &str) -> Option<String> {
	non_empty(var)
}

/// Returns the value of `var`, or `default` when it is unset or empty.
pub fn env_or_default(var: &str, default: &str) -> String {
	non_empty(var).unwrap_or_else(|| default.to_string())
}

/// Parses `var` into `T`, falling back to `default` when unset or empty.
pub fn env_parse_or_default<T>(var: &str, default: T) -> Result<T, EnvError>
where
	T: FromStr,
	T::Err: std::fmt::Display,
{
	match non_empty(var) {
		Some(raw) => raw.parse().map_err(|e: T::Err| EnvError::InvalidValue {
			var: var.to_string(),
			message: e.to_string(),
		}),
		None => Ok(default),
	}
}

/// Loads a secret using the `VAR` / `VAR_FILE` convention.
///
/// `{var}_FILE` wins over `{var}`. File content has a single trailing newline
/// stripped, which is how Kubernetes secret volumes usually render values.
pub fn load_secret_env(var: &str) -> Result<Option<SecretString>, EnvError> {
	let file_var = format!("{var}_FILE");

	if let Ok(path_str) = env::var(&file_var) {
		if path_str.is_empty() {
			return Err(EnvError::EmptyPath { var: file_var });
		}

		let path = PathBuf::from(path_str);
		let content = fs::read_to_string(&path).map_err(|source| EnvError::Io {
			path: path.clone(),
			source,
		})?;
		let value = content.strip_suffix('\n').unwrap_or(&content).to_string();
		return Ok(Some(SecretString::new(value)));
	}

	Ok(non_empty(var).map(SecretString::new))
}
