// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the daemon and its client.

use crate::protocol::Fault;

/// Errors raised outside the lease core: configuration, sockets, framing.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// The pool geometry was rejected.
    #[error("pool error: {0}")]
    PoolError(#[from] buddy_pool::PoolError),

    /// Socket I/O failed.
    #[error("i/o error on '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A line could not be encoded or decoded.
    #[error("protocol error: {0}")]
    ProtocolError(#[from] serde_json::Error),

    /// The daemon answered with a fault.
    #[error("{0}")]
    Fault(Fault),

    /// The daemon answered with a reply of the wrong kind.
    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),

    /// The peer closed the connection before replying.
    #[error("connection closed by daemon")]
    Disconnected,
}

impl ServiceError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.display().to_string(),
            source,
        }
    }
}
