// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the lease registry.

use buddy_pool::PoolError;

/// Errors returned by lease operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeaseError {
    /// The pool refused the request (zero size, too large, exhausted).
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// Another live lease already holds this alias.
    #[error("alias '{0}' is already in use")]
    AliasInUse(String),

    /// The alias cannot be used as a path segment.
    #[error("invalid alias '{0}': aliases must not contain '/' or NUL")]
    InvalidAlias(String),

    /// No live lease has this identifier or alias.
    #[error("no lease with id or alias '{0}'")]
    NotFound(String),

    /// The object path does not name a lease or the manager.
    #[error("invalid object path '{0}'")]
    InvalidPath(String),

    /// The lease has no property of this name.
    #[error("unknown lease property '{0}'")]
    UnknownProperty(String),
}
