// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `uidalloc daemon` command: serve leases until SIGINT or SIGTERM.

use tokio::signal::unix::{signal, SignalKind};
use uidalloc_service::{Daemon, ServiceConfig};

pub async fn execute(config: ServiceConfig) -> anyhow::Result<()> {
    let daemon = Daemon::bind(&config)?;
    tracing::info!(
        "uidalloc {} serving {} under {}",
        env!("CARGO_PKG_VERSION"),
        daemon.socket_path().display(),
        config.object_root
    );
    daemon.run_until(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::warn!("cannot watch SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown requested");
}
