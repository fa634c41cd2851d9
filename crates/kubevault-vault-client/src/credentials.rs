// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Vault session lifecycle.
//!
//! The manager holds at most one Vault token. [`CredentialManager::ensure_authenticated`]
//! probes it with a self-lookup and, when there is none or the probe fails,
//! logs in again with the workload's service-account JWT.
//!
//! ```text
//!   Unauthenticated ──login ok──▶ Authenticated ◀──login ok── Invalidated
//!                                      │                          ▲
//!                                      └──────probe fails─────────┘
//! ```
//!
//! A failed login leaves the state untouched: an `Invalidated` token stays
//! attached for reads, and the next call goes straight to login.

use std::sync::Arc;

use kubevault_common_secret::SecretString;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::backend::{BackendError, VaultBackend};
use crate::error::{VaultClientError, VaultClientResult};
use crate::token_source::IdentityTokenSource;

/// Where the held Vault token stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
	/// No token held yet.
	Unauthenticated,
	/// Token obtained from a login, or seeded and not yet disproved.
	Authenticated(SecretString),
	/// Vault rejected the self-lookup for this token and no replacement has
	/// been obtained yet.
	Invalidated(SecretString),
}

impl SessionState {
	/// Token attached to outgoing reads, if any.
	pub fn credential(&self) -> Option<&SecretString> {
		match self {
			SessionState::Unauthenticated => None,
			SessionState::Authenticated(token) | SessionState::Invalidated(token) => Some(token),
		}
	}

	/// Token worth probing before deciding to log in.
	fn probe_candidate(&self) -> Option<&SecretString> {
		match self {
			SessionState::Authenticated(token) => Some(token),
			_ => None,
		}
	}

	fn invalidate(&mut self) {
		if let SessionState::Authenticated(token) =
			std::mem::replace(self, SessionState::Unauthenticated)
		{
			*self = SessionState::Invalidated(token);
		}
	}
}

/// Owns the Vault backend and the single session token.
///
/// The check-then-login sequence runs under one async mutex, so concurrent
/// callers sharing a manager never log in twice for the same invalid token.
pub struct CredentialManager {
	backend: Arc<dyn VaultBackend>,
	token_source: Arc<dyn IdentityTokenSource>,
	role: String,
	state: Mutex<SessionState>,
}

impl CredentialManager {
	pub fn new(
		backend: Arc<dyn VaultBackend>,
		token_source: Arc<dyn IdentityTokenSource>,
		role: impl Into<String>,
	) -> Self {
		Self {
			backend,
			token_source,
			role: role.into(),
			state: Mutex::new(SessionState::Unauthenticated),
		}
	}

	/// Start from an existing Vault token (e.g. `VAULT_TOKEN`). It is probed on
	/// the first [`ensure_authenticated`](Self::ensure_authenticated) call.
	pub fn with_session_token(mut self, token: SecretString) -> Self {
		*self.state.get_mut() = SessionState::Authenticated(token);
		self
	}

	pub fn role(&self) -> &str {
		&self.role
	}

	/// Make sure a token Vault accepts is attached.
	///
	/// Performs one self-lookup when a token is held, and one login when there
	/// is none or the lookup failed.
	///
	/// A token that already failed its self-lookup ([`SessionState::Invalidated`])
	/// stays attached for reads but is not probed again: the next call goes
	/// straight to login.
	#[instrument(skip(self), fields(role = %self.role))]
	pub async fn ensure_authenticated(&self) -> VaultClientResult<()> {
		let mut state = self.state.lock().await;

		if let Some(token) = state.probe_candidate().cloned() {
			match self.backend.lookup_self(&token).await {
				Ok(()) => {
					debug!("vault token still valid");
					return Ok(());
				}
				Err(e) => {
					warn!(error = %e, "vault token failed self-lookup, logging in again");
					state.invalidate();
				}
			}
		}

		let token = self.login().await?;
		*state = SessionState::Authenticated(token);
		Ok(())
	}

	async fn login(&self) -> VaultClientResult<SecretString> {
		let jwt = self
			.token_source
			.read_token()
			.await
			.map_err(|source| VaultClientError::TokenUnavailable {
				location: self.token_source.location(),
				source,
			})?;

		let auth = self
			.backend
			.kubernetes_login(&self.role, &jwt)
			.await
			.map_err(|source| VaultClientError::AuthExchangeFailed {
				role: self.role.clone(),
				source,
			})?
			.ok_or_else(|| VaultClientError::AuthResponseInvalid("no auth info in response".into()))?;

		if auth.client_token.expose().is_empty() {
			return Err(VaultClientError::AuthResponseInvalid(
				"auth info carried an empty client token".into(),
			));
		}

		info!(
			policies = ?auth.policies,
			lease_duration = auth.lease_duration,
			renewable = auth.renewable,
			"authenticated with vault"
		);

		Ok(auth.client_token)
	}

	/// Snapshot of the current session state.
	pub async fn state(&self) -> SessionState {
		self.state.lock().await.clone()
	}

	/// Token currently attached to reads, if any.
	pub async fn credential(&self) -> Option<SecretString> {
		self.state.lock().await.credential().cloned()
	}

	/// Logical read with whatever token is attached right now.
	pub async fn read(&self, path: &str) -> Result<Option<Value>, BackendError> {
		let token = self.credential().await;
		self.backend.read(token.as_ref(), path).await
	}
}

impl std::fmt::Debug for CredentialManager {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = match self.state.try_lock() {
			Ok(state) => match &*state {
				SessionState::Unauthenticated => "unauthenticated",
				SessionState::Authenticated(_) => "authenticated",
				SessionState::Invalidated(_) => "invalidated",
			},
			Err(_) => "busy",
		};
		f.debug_struct("CredentialManager")
			.field("role", &self.role)
			.field("token_source", &self.token_source.location())
			.field("state", &state)
			.finish()
	}
}
