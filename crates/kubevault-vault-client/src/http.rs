// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! reqwest implementation of [`VaultBackend`] against the Vault HTTP API.

use async_trait::async_trait;
use kubevault_common_secret::SecretString;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::backend::{BackendError, LoginAuth, VaultBackend};
use crate::config::VaultConfig;
use crate::error::{VaultClientError, VaultClientResult};

const TOKEN_HEADER: &str = "X-Vault-Token";
const NAMESPACE_HEADER: &str = "X-Vault-Namespace";

/// Maximum number of characters of an unparseable error body kept in errors.
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
	role: &'a str,
	jwt: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
	auth: Option<AuthBlock>,
}

#[derive(Deserialize)]
struct AuthBlock {
	#[serde(default)]
	client_token: String,
	#[serde(default)]
	accessor: Option<String>,
	#[serde(default)]
	policies: Vec<String>,
	#[serde(default)]
	lease_duration: u64,
	#[serde(default)]
	renewable: bool,
}

impl std::fmt::Debug for AuthBlock {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AuthBlock")
			.field("policies", &self.policies)
			.field("lease_duration", &self.lease_duration)
			.finish_non_exhaustive()
	}
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
	#[serde(default)]
	errors: Vec<String>,
}

/// Vault backend speaking HTTP.
pub struct HttpVaultBackend {
	http_client: reqwest::Client,
	base_url: Url,
	namespace: Option<String>,
	auth_mount: String,
}

impl HttpVaultBackend {
	pub fn new(config: &VaultConfig) -> VaultClientResult<Self> {
		let base_url = Url::parse(&config.addr)
			.ok()
			.filter(|url| matches!(url.scheme(), "http" | "https"))
			.ok_or_else(|| {
				VaultClientError::Configuration(format!(
					"vault address must be an http(s) URL, got {:?}",
					config.addr
				))
			})?;

		let http_client = reqwest::Client::builder()
			.timeout(config.timeout)
			.user_agent(concat!("kubevault/", env!("CARGO_PKG_VERSION")))
			.build()
			.map_err(|e| VaultClientError::Configuration(format!("failed to create HTTP client: {e}")))?;

		Ok(Self {
			http_client,
			base_url,
			namespace: config.namespace.clone(),
			auth_mount: config.auth_mount.trim_matches('/').to_string(),
		})
	}

	/// `{addr}/v1/{path}`, with each segment of `path` percent-encoded so
	/// `?`, `#`, `%` and spaces reach Vault as part of the path.
	///
	/// `.` and `..` segments are refused: the URL parser would resolve them
	/// and the request would leave the path it was asked for.
	fn url(&self, path: &str) -> Result<Url, BackendError> {
		let relative = path.trim_start_matches('/');
		if let Some(segment) = relative.split('/').find(|s| matches!(*s, "." | "..")) {
			return Err(BackendError::InvalidPath {
				path: path.to_string(),
				reason: format!("{segment:?} segments are not allowed"),
			});
		}

		let mut url = self.base_url.clone();
		url.path_segments_mut()
			.map_err(|()| BackendError::InvalidPath {
				path: path.to_string(),
				reason: "vault address cannot carry a path".to_string(),
			})?
			.pop_if_empty()
			.push("v1")
			.extend(relative.split('/'));
		Ok(url)
	}

	fn request(
		&self,
		method: Method,
		path: &str,
		token: Option<&SecretString>,
	) -> Result<RequestBuilder, BackendError> {
		let mut builder = self.http_client.request(method, self.url(path)?);
		if let Some(token) = token {
			builder = builder.header(TOKEN_HEADER, token.expose());
		}
		if let Some(namespace) = &self.namespace {
			builder = builder.header(NAMESPACE_HEADER, namespace);
		}
		Ok(builder)
	}
}

impl std::fmt::Debug for HttpVaultBackend {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("HttpVaultBackend")
			.field("base_url", &self.base_url.as_str())
			.field("namespace", &self.namespace)
			.field("auth_mount", &self.auth_mount)
			.finish()
	}
}

#[async_trait]
impl VaultBackend for HttpVaultBackend {
	#[instrument(skip_all)]
	async fn lookup_self(&self, token: &SecretString) -> Result<(), BackendError> {
		let response = self
			.request(Method::GET, "auth/token/lookup-self", Some(token))?
			.send()
			.await?;

		if response.status().is_success() {
			Ok(())
		} else {
			Err(status_error(response).await)
		}
	}

	#[instrument(skip(self, jwt), fields(mount = %self.auth_mount))]
	async fn kubernetes_login(
		&self,
		role: &str,
		jwt: &SecretString,
	) -> Result<Option<LoginAuth>, BackendError> {
		let path = format!("auth/{}/login", self.auth_mount);
		let response = self
			.request(Method::POST, &path, None)?
			.json(&LoginRequest {
				role,
				jwt: jwt.expose(),
			})
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(status_error(response).await);
		}

		let body = response.bytes().await?;
		if body.is_empty() {
			return Ok(None);
		}
		let parsed: LoginResponse =
			serde_json::from_slice(&body).map_err(|e| BackendError::Decode(e.to_string()))?;

		Ok(parsed.auth.map(|auth| LoginAuth {
			client_token: SecretString::new(auth.client_token),
			accessor: auth.accessor,
			policies: auth.policies,
			lease_duration: auth.lease_duration,
			renewable: auth.renewable,
		}))
	}

	#[instrument(skip(self, token))]
	async fn read(
		&self,
		token: Option<&SecretString>,
		path: &str,
	) -> Result<Option<Value>, BackendError> {
		let response = self.request(Method::GET, path, token)?.send().await?;
		let status = response.status();

		if status == StatusCode::NOT_FOUND {
			debug!("vault reported nothing at path");
			return Ok(None);
		}
		if !status.is_success() {
			return Err(status_error(response).await);
		}

		let body = response.bytes().await?;
		if body.is_empty() {
			return Ok(None);
		}
		serde_json::from_slice(&body)
			.map(Some)
			.map_err(|e| BackendError::Decode(e.to_string()))
	}
}

async fn status_error(response: Response) -> BackendError {
	let status = response.status().as_u16();
	let body = response.text().await.unwrap_or_default();

	let errors = match serde_json::from_str::<ErrorBody>(&body) {
		Ok(parsed) => parsed.errors,
		Err(_) if body.trim().is_empty() => Vec::new(),
		Err(_) => vec![sanitize_body_for_error(&body, MAX_ERROR_BODY_CHARS)],
	};

	BackendError::Status { status, errors }
}

fn sanitize_body_for_error(body: &str, max_len: usize) -> String {
	let sanitized: String = body
		.chars()
		.filter(|c| !c.is_control() || *c == ' ')
		.take(max_len)
		.collect();
	if body.chars().count() > max_len {
		format!("{sanitized}...")
	} else {
		sanitized
	}
}
