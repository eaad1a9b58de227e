// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `uidalloc list` command: one line per live lease, by start address.

use uidalloc_service::ServiceConfig;

pub async fn execute(config: &ServiceConfig) -> anyhow::Result<()> {
    let mut client = super::connect(config).await?;
    let leases = client.list().await?;

    if leases.is_empty() {
        println!("no live leases");
        return Ok(());
    }

    println!(
        "  {:<20} {:>12} {:>12} {:>10}  {}",
        "ID", "Start", "End", "Size", "Alias"
    );
    println!("  {}", "-".repeat(66));
    for lease in &leases {
        println!(
            "  {:<20} {:>#12x} {:>#12x} {:>10}  {}{}",
            lease.id.as_str(),
            lease.start,
            lease.end,
            lease.size,
            lease.alias,
            if lease.persistent { " (persistent)" } else { "" }
        );
    }
    println!();
    println!("  {} leases, {} ids", leases.len(), leases.iter().map(|l| l.size).sum::<u64>());
    Ok(())
}
