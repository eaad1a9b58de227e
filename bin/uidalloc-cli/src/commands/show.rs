// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `uidalloc show` command: print one or all properties of a lease.

use lease_registry::PathScheme;
use uidalloc_service::ServiceConfig;

pub async fn execute(
    config: &ServiceConfig,
    target: &str,
    property: Option<&str>,
) -> anyhow::Result<()> {
    let path = super::target_path(&PathScheme::new(&config.object_root), target);
    let mut client = super::connect(config).await?;

    if let Some(property) = property {
        println!("{}", client.get(&path, property).await?);
        return Ok(());
    }

    let (path, lease) = client.describe(&path).await?;
    println!("{path}");
    println!("  ID:         {}", lease.id);
    println!("  Alias:      {}", lease.alias);
    println!("  Start:      {} ({:#x})", lease.start, lease.start);
    println!("  End:        {} ({:#x})", lease.end, lease.end);
    println!("  Size:       {}", lease.size);
    println!("  Persistent: {}", lease.persistent);
    Ok(())
}
