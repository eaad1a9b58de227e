// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Object paths naming the manager and individual leases.
//!
//! ```text
//! /uidalloc                          manager
//! /uidalloc/leases/08_0000000080000000   lease by identifier
//! /uidalloc/aliases/web              lease by alias
//! ```

use crate::LeaseError;
use std::fmt;

const LEASES: &str = "leases";
const ALIASES: &str = "aliases";

/// A parsed object path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectPath {
    Manager,
    Lease(String),
    Alias(String),
}

/// Builds and parses object paths under a fixed root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathScheme {
    root: String,
}

impl PathScheme {
    /// `root` is normalised to a leading `/` and no trailing `/`.
    pub fn new(root: &str) -> Self {
        let trimmed = root.trim_matches('/');
        Self {
            root: if trimmed.is_empty() {
                String::new()
            } else {
                format!("/{trimmed}")
            },
        }
    }

    /// The manager object path.
    pub fn root(&self) -> &str {
        if self.root.is_empty() {
            "/"
        } else {
            &self.root
        }
    }

    /// Accepts a [`LeaseId`](crate::LeaseId) or its textual form.
    pub fn lease_path(&self, id: impl AsRef<str>) -> String {
        format!("{}/{LEASES}/{}", self.root, id.as_ref())
    }

    pub fn alias_path(&self, alias: &str) -> String {
        format!("{}/{ALIASES}/{alias}", self.root)
    }

    /// Splits `path` into the object it names.
    pub fn parse(&self, path: &str) -> Result<ObjectPath, LeaseError> {
        let invalid = || LeaseError::InvalidPath(path.to_string());

        let path = path.strip_suffix('/').filter(|p| !p.is_empty()).unwrap_or(path);
        if path == self.root() {
            return Ok(ObjectPath::Manager);
        }
        let rest = path
            .strip_prefix(self.root.as_str())
            .and_then(|r| r.strip_prefix('/'))
            .ok_or_else(invalid)?;
        let (kind, name) = rest.split_once('/').ok_or_else(invalid)?;
        if name.is_empty() || name.contains('/') {
            return Err(invalid());
        }
        match kind {
            LEASES => Ok(ObjectPath::Lease(name.to_string())),
            ALIASES => Ok(ObjectPath::Alias(name.to_string())),
            _ => Err(invalid()),
        }
    }
}

impl Default for PathScheme {
    fn default() -> Self {
        Self::new("/uidalloc")
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectPath::Manager => f.write_str("manager"),
            ObjectPath::Lease(id) => write!(f, "lease {id}"),
            ObjectPath::Alias(alias) => write!(f, "alias {alias}"),
        }
    }
}
