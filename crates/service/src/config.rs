// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Daemon configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! socket_path = "/run/user/1000/uidalloc.sock"
//! object_root = "/uidalloc"
//!
//! [pool]
//! start = 2147483648
//! end = 4294967295
//! max_exp = 28
//! ```
//!
//! Every field is optional.

use crate::ServiceError;
use buddy_pool::PoolConfig;
use std::path::{Path, PathBuf};

/// Socket file name used under the runtime directory.
pub const SOCKET_NAME: &str = "uidalloc.sock";

/// Configuration for the lease daemon.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Unix socket to listen on; see [`ServiceConfig::resolve_socket_path`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket_path: Option<PathBuf>,
    /// Prefix of every object path.
    pub object_root: String,
    /// Pool geometry.
    pub pool: PoolConfig,
}

impl ServiceConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ServiceError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ServiceError::ConfigError(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ServiceError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| ServiceError::ConfigError(format!("TOML parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, ServiceError> {
        toml::to_string_pretty(self)
            .map_err(|e| ServiceError::ConfigError(format!("TOML serialise error: {e}")))
    }

    /// Checks the pool geometry and the object root.
    pub fn validate(&self) -> Result<(), ServiceError> {
        self.pool.validate()?;
        if !self.object_root.starts_with('/') {
            return Err(ServiceError::ConfigError(format!(
                "object_root '{}' must start with '/'",
                self.object_root
            )));
        }
        Ok(())
    }

    /// Resolves the socket path: the configured one, else
    /// `$XDG_RUNTIME_DIR/uidalloc.sock`, else `/tmp/uidalloc.sock`.
    pub fn resolve_socket_path(&self) -> PathBuf {
        if let Some(path) = &self.socket_path {
            return path.clone();
        }
        default_socket_path(std::env::var_os("XDG_RUNTIME_DIR").map(PathBuf::from))
    }
}

fn default_socket_path(runtime_dir: Option<PathBuf>) -> PathBuf {
    runtime_dir
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(SOCKET_NAME)
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            socket_path: None,
            object_root: "/uidalloc".to_string(),
            pool: PoolConfig::default(),
        }
    }
}
