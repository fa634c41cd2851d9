// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Where the workload's identity proof comes from.

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use kubevault_common_secret::SecretString;

use crate::config::SA_TOKEN_PATH;

/// Supplies the JWT presented to Vault's Kubernetes auth method.
///
/// Implementations must not cache: projected service-account tokens rotate,
/// so every login reads a fresh copy.
#[async_trait]
pub trait IdentityTokenSource: Send + Sync {
	async fn read_token(&self) -> io::Result<SecretString>;

	/// Human-readable origin, used in error messages.
	fn location(&self) -> String;
}

/// Reads the token from a file, by default the pod's service-account mount.
#[derive(Debug, Clone)]
pub struct FileTokenSource {
	path: PathBuf,
}

impl FileTokenSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn in_cluster() -> Self {
		Self::new(SA_TOKEN_PATH)
	}
}

#[async_trait]
impl IdentityTokenSource for FileTokenSource {
	async fn read_token(&self) -> io::Result<SecretString> {
		let mut token = tokio::fs::read_to_string(&self.path).await?;
		// Only the line terminator an editor or `echo` leaves behind; the
		// contents are otherwise opaque and Vault judges them.
		let len = token.trim_end_matches(|c: char| c == '\n' || c == '\r').len();
		token.truncate(len);
		Ok(SecretString::new(token))
	}

	fn location(&self) -> String {
		self.path.display().to_string()
	}
}

/// Fixed token, or none at all. Used in tests and local development.
#[derive(Debug, Clone)]
pub struct StaticTokenSource {
	token: Option<SecretString>,
}

impl StaticTokenSource {
	pub fn new(token: impl Into<String>) -> Self {
		Self {
			token: Some(SecretString::new(token.into())),
		}
	}

	/// A source whose every read fails.
	pub fn unavailable() -> Self {
		Self { token: None }
	}
}

#[async_trait]
impl IdentityTokenSource for StaticTokenSource {
	async fn read_token(&self) -> io::Result<SecretString> {
		self.token.clone().ok_or_else(|| {
			io::Error::new(io::ErrorKind::NotFound, "no static token configured")
		})
	}

	fn location(&self) -> String {
		"static token".to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;
	use tempfile::NamedTempFile;

	#[tokio::test]
	async fn file_source_strips_newline_and_rereads() {
		let mut file = NamedTempFile::new().unwrap();
		writeln!(file, "eyJ.first.sig").unwrap();
		let source = FileTokenSource::new(file.path());

		assert_eq!(source.read_token().await.unwrap().expose(), "eyJ.first.sig");

		std::fs::write(file.path(), "eyJ.second.sig\n").unwrap();
		assert_eq!(source.read_token().await.unwrap().expose(), "eyJ.second.sig");
	}

	#[tokio::test]
	async fn file_source_missing_file_is_not_found() {
		let source = FileTokenSource::new("/nonexistent/kubevault/token");
		let err = source.read_token().await.unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::NotFound);
		assert_eq!(source.location(), "/nonexistent/kubevault/token");
	}

	#[tokio::test]
	async fn file_source_passes_contents_through_unchecked() {
		let file = NamedTempFile::new().unwrap();
		let source = FileTokenSource::new(file.path());
		assert_eq!(source.read_token().await.unwrap().expose(), "");

		std::fs::write(file.path(), " eyJ.padded.sig \r\n").unwrap();
		assert_eq!(source.read_token().await.unwrap().expose(), " eyJ.padded.sig ");
	}

	#[test]
	fn in_cluster_uses_service_account_mount() {
		assert_eq!(FileTokenSource::in_cluster().location(), SA_TOKEN_PATH);
	}

	#[tokio::test]
	async fn static_source_unavailable_fails() {
		assert!(StaticTokenSource::unavailable().read_token().await.is_err());
		let token = StaticTokenSource::new("jwt").read_token().await.unwrap();
		assert_eq!(token.expose(), "jwt");
	}
}
