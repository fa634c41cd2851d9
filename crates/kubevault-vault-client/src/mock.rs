// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory [`VaultBackend`] for tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use kubevault_common_secret::SecretString;
use serde_json::Value;

use crate::backend::{BackendError, LoginAuth, VaultBackend};

/// A fake Vault that issues tokens, answers self-lookups and serves canned
/// read responses, recording every call it receives.
#[derive(Debug, Default)]
pub struct MockVaultBackend {
	inner: Mutex<MockState>,
}

#[derive(Debug, Default)]
struct MockState {
	valid_tokens: HashSet<String>,
	issued: u32,
	login_failure: Option<u16>,
	omit_auth: bool,
	read_failure: Option<u16>,
	secrets: HashMap<String, Value>,
	lookup_calls: usize,
	login_calls: usize,
	last_login: Option<(String, String)>,
	reads: Vec<(String, Option<String>)>,
}

impl MockVaultBackend {
	pub fn new() -> Self {
		Self::default()
	}

	/// Make self-lookups succeed for `token`.
	pub fn accept_token(&self, token: &str) {
		self.inner.lock().unwrap().valid_tokens.insert(token.to_string());
	}

	/// Forget every token issued or accepted so far.
	pub fn revoke_all(&self) {
		self.inner.lock().unwrap().valid_tokens.clear();
	}

	/// Reject every subsequent login with `status`.
	pub fn fail_logins(&self, status: u16) {
		self.inner.lock().unwrap().login_failure = Some(status);
	}

	/// Answer logins successfully but without an `auth` block.
	pub fn omit_login_auth(&self) {
		self.inner.lock().unwrap().omit_auth = true;
	}

	/// Reject every subsequent read with `status`.
	pub fn fail_reads(&self, status: u16) {
		self.inner.lock().unwrap().read_failure = Some(status);
	}

	/// Serve `body` verbatim for reads of `path`.
	pub fn insert_response(&self, path: &str, body: Value) {
		self.inner.lock().unwrap().secrets.insert(path.to_string(), body);
	}

	pub fn lookup_calls(&self) -> usize {
		self.inner.lock().unwrap().lookup_calls
	}

	pub fn login_calls(&self) -> usize {
		self.inner.lock().unwrap().login_calls
	}

	/// Role and JWT of the most recent login.
	pub fn last_login(&self) -> Option<(String, String)> {
		self.inner.lock().unwrap().last_login.clone()
	}

	/// Every read so far as `(path, token)`.
	pub fn reads(&self) -> Vec<(String, Option<String>)> {
		self.inner.lock().unwrap().reads.clone()
	}
}

#[async_trait]
impl VaultBackend for MockVaultBackend {
	async fn lookup_self(&self, token: &SecretString) -> Result<(), BackendError> {
		let mut state = self.inner.lock().unwrap();
		state.lookup_calls += 1;
		if state.valid_tokens.contains(token.expose()) {
			Ok(())
		} else {
			Err(BackendError::Status {
				status: 403,
				errors: vec!["permission denied".to_string()],
			})
		}
	}

	async fn kubernetes_login(
		&self,
		role: &str,
		jwt: &SecretString,
	) -> Result<Option<LoginAuth>, BackendError> {
		let mut state = self.inner.lock().unwrap();
		state.login_calls += 1;
		state.last_login = Some((role.to_string(), jwt.expose().clone()));

		if let Some(status) = state.login_failure {
			return Err(BackendError::Status {
				status,
				errors: vec!["permission denied".to_string()],
			});
		}
		if state.omit_auth {
			return Ok(None);
		}

		state.issued += 1;
		let token = format!("hvs.mock-{}", state.issued);
		state.valid_tokens.insert(token.clone());

		Ok(Some(LoginAuth {
			client_token: SecretString::new(token),
			accessor: None,
			policies: vec!["default".to_string()],
			lease_duration: 3600,
			renewable: true,
		}))
	}

	async fn read(
		&self,
		token: Option<&SecretString>,
		path: &str,
	) -> Result<Option<Value>, BackendError> {
		let mut state = self.inner.lock().unwrap();
		state
			.reads
			.push((path.to_string(), token.map(|t| t.expose().clone())));

		if let Some(status) = state.read_failure {
			return Err(BackendError::Status {
				status,
				errors: vec!["internal error".to_string()],
			});
		}
		Ok(state.secrets.get(path).cloned())
	}
}
