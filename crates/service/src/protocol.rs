// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Line-delimited JSON messages exchanged over the daemon socket.
//!
//! # Requests
//! ```text
//! {"method":"Allocate","alias":"web","size":65536,"persistent":false}
//! {"method":"Release","path":"/uidalloc/aliases/web"}
//! {"method":"Get","path":"/uidalloc/leases/11_0000000080000000","property":"Start"}
//! {"method":"Describe","path":"/uidalloc/aliases/web"}
//! {"method":"List"}
//! {"method":"Stats"}
//! ```
//!
//! # Responses
//! ```text
//! {"ok":{"kind":"allocated","path":"/uidalloc/leases/11_...","start":2147483648,"length":65536}}
//! {"error":{"name":"AliasInUse","message":"alias 'web' is already in use"}}
//! ```

use buddy_pool::{PoolError, PoolStats};
use lease_registry::{LeaseError, LeaseInfo, PropertyValue};
use std::fmt;

/// A request from a client.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "method")]
pub enum Request {
    /// Lease at least `size` ids. An empty alias means none.
    Allocate {
        #[serde(default)]
        alias: String,
        size: u64,
        #[serde(default)]
        persistent: bool,
    },
    /// Release the lease at `path`.
    Release { path: String },
    /// Read one property of the lease at `path`.
    Get { path: String, property: String },
    /// Read every property of the lease at `path`.
    Describe { path: String },
    /// All live leases.
    List,
    /// Pool occupancy.
    Stats,
}

/// Successful reply payloads.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    Allocated { path: String, start: u64, length: u64 },
    Released { lease: LeaseInfo },
    Property { name: String, value: PropertyValue },
    Lease { path: String, lease: LeaseInfo },
    Leases { leases: Vec<LeaseInfo> },
    Stats { leases: usize, stats: PoolStats },
}

/// One response line.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Response {
    Ok(Reply),
    Error(Fault),
}

impl Response {
    /// Converts into a `Result`, turning faults into errors.
    pub fn into_result(self) -> Result<Reply, Fault> {
        match self {
            Response::Ok(reply) => Ok(reply),
            Response::Error(fault) => Err(fault),
        }
    }
}

impl From<Result<Reply, Fault>> for Response {
    fn from(result: Result<Reply, Fault>) -> Self {
        match result {
            Ok(reply) => Response::Ok(reply),
            Err(fault) => Response::Error(fault),
        }
    }
}

/// Names of the faults a request can fail with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FaultKind {
    InvalidSize,
    SizeTooLarge,
    PoolExhausted,
    AliasInUse,
    NotFound,
    InvalidRequest,
    InvalidPath,
    InvalidAlias,
    UnknownProperty,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A named failure with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fault {
    pub name: FaultKind,
    pub message: String,
}

impl Fault {
    pub fn new(name: FaultKind, message: impl Into<String>) -> Self {
        Self {
            name,
            message: message.into(),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

impl std::error::Error for Fault {}

impl From<&LeaseError> for Fault {
    fn from(err: &LeaseError) -> Self {
        let name = match err {
            LeaseError::Pool(PoolError::InvalidSize) => FaultKind::InvalidSize,
            LeaseError::Pool(PoolError::SizeTooLarge { .. }) => FaultKind::SizeTooLarge,
            LeaseError::Pool(PoolError::PoolExhausted { .. }) => FaultKind::PoolExhausted,
            LeaseError::Pool(PoolError::InvalidConfig(_)) => FaultKind::InvalidRequest,
            LeaseError::AliasInUse(_) => FaultKind::AliasInUse,
            LeaseError::InvalidAlias(_) => FaultKind::InvalidAlias,
            LeaseError::NotFound(_) => FaultKind::NotFound,
            LeaseError::InvalidPath(_) => FaultKind::InvalidPath,
            LeaseError::UnknownProperty(_) => FaultKind::UnknownProperty,
        };
        Fault::new(name, err.to_string())
    }
}

impl From<LeaseError> for Fault {
    fn from(err: LeaseError) -> Self {
        Fault::from(&err)
    }
}
