// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `uidalloc alloc` command: lease a range and print where it lives.

use uidalloc_service::ServiceConfig;

pub async fn execute(
    config: &ServiceConfig,
    count: u64,
    alias: String,
    persistent: bool,
) -> anyhow::Result<()> {
    let mut client = super::connect(config).await?;
    let lease = client.allocate(count, &alias, persistent).await?;

    println!("{}", lease.path);
    println!("  start: {} ({:#x})", lease.start, lease.start);
    println!("  size:  {}", lease.length);
    if lease.length != count {
        tracing::debug!("rounded {count} up to {}", lease.length);
    }
    Ok(())
}
