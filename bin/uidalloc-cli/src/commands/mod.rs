// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared helpers.

pub mod alloc;
pub mod daemon;
pub mod list;
pub mod release;
pub mod show;
pub mod status;

use anyhow::Context;
use lease_registry::PathScheme;
use std::path::{Path, PathBuf};
use uidalloc_service::{Client, ServiceConfig};

/// Installs the `tracing` subscriber. `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Reads the configuration file, if any, and applies the socket override.
pub fn load_config(file: Option<&Path>, socket: Option<PathBuf>) -> anyhow::Result<ServiceConfig> {
    let mut config = match file {
        Some(path) => ServiceConfig::from_file(path)?,
        None => ServiceConfig::default(),
    };
    if socket.is_some() {
        config.socket_path = socket;
    }
    Ok(config)
}

/// Connects to the daemon named by `config`.
pub async fn connect(config: &ServiceConfig) -> anyhow::Result<Client> {
    let socket = config.resolve_socket_path();
    Client::connect(&socket)
        .await
        .with_context(|| format!("is the daemon running on '{}'?", socket.display()))
}

/// Turns a command-line lease reference into an object path.
///
/// `alias=NAME` names an alias, an argument starting with `/` is taken as a
/// path verbatim, anything else is a lease id.
pub fn target_path(paths: &PathScheme, target: &str) -> String {
    if let Some(alias) = target.strip_prefix("alias=") {
        paths.alias_path(alias)
    } else if target.starts_with('/') {
        target.to_string()
    } else {
        paths.lease_path(target)
    }
}

/// Parses an id count: decimal, `0x` hexadecimal or `0o` octal.
pub fn parse_count(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let (digits, radix) = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        (hex, 16)
    } else if let Some(oct) = s.strip_prefix("0o").or_else(|| s.strip_prefix("0O")) {
        (oct, 8)
    } else {
        (s, 10)
    };
    u64::from_str_radix(digits, radix).map_err(|e| format!("invalid count '{s}': {e}"))
}
