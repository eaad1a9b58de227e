// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `uidalloc release` command.

use lease_registry::PathScheme;
use uidalloc_service::ServiceConfig;

pub async fn execute(config: &ServiceConfig, target: &str) -> anyhow::Result<()> {
    let path = super::target_path(&PathScheme::new(&config.object_root), target);
    let mut client = super::connect(config).await?;
    let lease = client.release(&path).await?;
    println!(
        "released {} [{:#x}, {:#x}] ({} ids)",
        lease.id, lease.start, lease.end, lease.size
    );
    Ok(())
}
