// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP routes.
//!
//! Endpoints:
//! - `GET /health` - liveness
//! - `GET /cluster-secret/{path}` - read from `cluster-secrets/data/`
//! - `GET /app-secret/{path}` - read from `app-secrets/data/`
//!
//! `{path}` may span several segments (`/cluster-secret/db/creds`).

use axum::{
	extract::{Path, State},
	routing::get,
	Json, Router,
};
use kubevault_vault_client::{SecretData, SecretScope, VaultClient};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::instrument;

use crate::error::ApiError;

#[derive(Clone, Debug)]
pub struct AppState {
	pub vault: VaultClient,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
	pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SecretResponse {
	pub secret: SecretData,
}

/// GET /health - process liveness. Does not contact Vault.
pub async fn health() -> Json<HealthResponse> {
	Json(HealthResponse { status: "healthy" })
}

#[instrument(skip(state))]
pub async fn get_cluster_secret(
	State(state): State<AppState>,
	Path(path): Path<String>,
) -> Result<Json<SecretResponse>, ApiError> {
	read(&state, SecretScope::Cluster, &path).await
}

#[instrument(skip(state))]
pub async fn get_app_secret(
	State(state): State<AppState>,
	Path(path): Path<String>,
) -> Result<Json<SecretResponse>, ApiError> {
	read(&state, SecretScope::Application, &path).await
}

async fn read(
	state: &AppState,
	scope: SecretScope,
	path: &str,
) -> Result<Json<SecretResponse>, ApiError> {
	let secret = state.vault.read_secret(scope, path).await?;
	Ok(Json(SecretResponse { secret }))
}

pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/cluster-secret/{*path}", get(get_cluster_secret))
		.route("/app-secret/{*path}", get(get_app_secret))
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}
