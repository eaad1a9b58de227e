// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # uidalloc
//!
//! Daemon and command-line client for the uid range allocator.
//!
//! ## Usage
//! ```bash
//! # Run the daemon
//! uidalloc daemon --config /etc/uidalloc.toml
//!
//! # Lease 65536 ids under an alias, then release it
//! uidalloc alloc 0x10000 build-42
//! uidalloc release alias=build-42
//!
//! # Inspect
//! uidalloc show 11_0000000080000000 --property Start
//! uidalloc list
//! uidalloc status
//! ```

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "uidalloc",
    about = "Lease non-overlapping ranges of uids from a shared pool",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Daemon socket (overrides the configuration file).
    #[arg(short, long, global = true)]
    socket: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the lease daemon in the foreground.
    Daemon,

    /// Lease at least COUNT ids.
    Alloc {
        /// Number of ids: decimal, 0x hexadecimal or 0o octal.
        #[arg(value_parser = commands::parse_count)]
        count: u64,

        /// Optional alias that can be used instead of the lease id.
        alias: Option<String>,

        /// Mark the lease as persistent.
        #[arg(long)]
        persistent: bool,
    },

    /// Release a lease given its id or `alias=NAME`.
    Release {
        /// Lease id, `alias=NAME`, or a full object path.
        target: String,
    },

    /// Show the properties of a lease.
    Show {
        /// Lease id, `alias=NAME`, or a full object path.
        target: String,

        /// Print only this property (Start, End, Size, ID, Alias).
        #[arg(short, long)]
        property: Option<String>,
    },

    /// List all live leases.
    List,

    /// Display pool occupancy and counters.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    let config = commands::load_config(cli.config.as_deref(), cli.socket)?;

    match cli.command {
        Commands::Daemon => commands::daemon::execute(config).await,
        Commands::Alloc {
            count,
            alias,
            persistent,
        } => commands::alloc::execute(&config, count, alias.unwrap_or_default(), persistent).await,
        Commands::Release { target } => commands::release::execute(&config, &target).await,
        Commands::Show { target, property } => {
            commands::show::execute(&config, &target, property.as_deref()).await
        }
        Commands::List => commands::list::execute(&config).await,
        Commands::Status => commands::status::execute(&config).await,
    }
}
