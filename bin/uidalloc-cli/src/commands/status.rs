// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `uidalloc status` command: pool occupancy and lifetime counters.

use buddy_pool::block_len;
use uidalloc_service::ServiceConfig;

pub async fn execute(config: &ServiceConfig) -> anyhow::Result<()> {
    let mut client = super::connect(config).await?;
    let (leases, stats) = client.stats().await?;

    println!("  Pool");
    println!("   Capacity:     {} ids", stats.total_ids);
    println!("   Free:         {} ids", stats.free_ids);
    println!(
        "   Allocated:    {} ids ({:.2}%)  {}",
        stats.allocated_ids,
        stats.utilisation() * 100.0,
        usage_bar(stats.utilisation())
    );
    println!("   Peak:         {} ids", stats.peak_allocated_ids);
    println!("   Live leases:  {leases}");
    println!();

    println!("  Free blocks by size class");
    for (i, &count) in stats.free_blocks.iter().enumerate() {
        if count > 0 {
            let class = i as u32 + 1;
            println!("   class {class:>2}: {count:>6} x {} ids", block_len(class));
        }
    }
    println!();
    println!("{}", stats.summary());
    Ok(())
}

/// Creates a visual usage bar (0.0-1.0 scale).
fn usage_bar(ratio: f64) -> String {
    let filled = ((ratio * 20.0).round() as usize).min(20);
    let symbol = if ratio >= 0.9 {
        "#"
    } else if ratio >= 0.7 {
        "="
    } else {
        "-"
    };
    format!("[{}{}]", symbol.repeat(filled), ".".repeat(20 - filled))
}
