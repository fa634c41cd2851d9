// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use anyhow::{Context, Result};
use kubevault_server::{create_router, AppState, ServerConfig};
use kubevault_vault_client::VaultClient;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with(tracing_subscriber::fmt::layer().json())
		.init();

	info!("Starting kubevault-server");

	let config = ServerConfig::from_env()?;
	info!(
		vault_addr = %config.vault.addr,
		role = %config.vault.role_name,
		token_path = %config.vault.token_path.display(),
		seeded_token = config.vault.session_token.is_some(),
		"Loaded configuration"
	);

	let vault = VaultClient::connect(config.vault.clone())
		.await
		.context("failed to create Vault client")?;

	let app = create_router(AppState { vault });

	let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
	info!("listening on {}", config.listen_addr);

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown_signal())
		.await?;

	info!("Server shutdown complete");
	Ok(())
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = tokio::signal::ctrl_c().await {
			tracing::warn!(error = %e, "failed to listen for ctrl-c");
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			}
			Err(e) => {
				tracing::warn!(error = %e, "failed to install SIGTERM handler");
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}
	info!("Received shutdown signal");
}
