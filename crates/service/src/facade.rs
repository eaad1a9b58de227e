// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Request dispatch: decodes a request, runs it against the registry and
//! encodes the reply. No allocation logic lives here.

use crate::protocol::{Fault, FaultKind, Reply, Request, Response};
use crate::{ServiceConfig, ServiceError};
use buddy_pool::BuddyAllocator;
use lease_registry::{LeaseProperty, LeaseRegistry, ObjectPath, PathScheme};

/// Owns the registry and answers one request at a time.
pub struct Facade {
    registry: LeaseRegistry,
    paths: PathScheme,
}

impl Facade {
    /// Builds the pool described by `config`.
    pub fn new(config: &ServiceConfig) -> Result<Self, ServiceError> {
        config.validate()?;
        let allocator = BuddyAllocator::new(config.pool)?;
        Ok(Self::with_registry(
            LeaseRegistry::new(allocator),
            PathScheme::new(&config.object_root),
        ))
    }

    pub fn with_registry(registry: LeaseRegistry, paths: PathScheme) -> Self {
        Self { registry, paths }
    }

    pub fn registry(&self) -> &LeaseRegistry {
        &self.registry
    }

    pub fn paths(&self) -> &PathScheme {
        &self.paths
    }

    /// Answers one decoded request.
    pub fn handle(&mut self, request: Request) -> Response {
        tracing::debug!("request: {request:?}");
        let result = self.dispatch(request);
        if let Err(fault) = &result {
            tracing::warn!("request failed: {fault}");
        }
        result.into()
    }

    /// Answers one raw line. Lines that do not decode yield `InvalidRequest`
    /// and never reach the registry.
    pub fn handle_line(&mut self, line: &str) -> Response {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle(request),
            Err(e) => {
                tracing::warn!("malformed request: {e}");
                Response::Error(Fault::new(FaultKind::InvalidRequest, e.to_string()))
            }
        }
    }

    fn dispatch(&mut self, request: Request) -> Result<Reply, Fault> {
        match request {
            Request::Allocate {
                alias,
                size,
                persistent,
            } => {
                let lease = self.registry.allocate(size, &alias, persistent)?;
                Ok(Reply::Allocated {
                    path: self.paths.lease_path(lease.id()),
                    start: lease.start(),
                    length: lease.size(),
                })
            }
            Request::Release { path } => {
                let target = self.lease_path(&path)?;
                let lease = self.registry.release_path(&target)?;
                Ok(Reply::Released { lease })
            }
            Request::Get { path, property } => {
                let property: LeaseProperty = property.parse()?;
                let lease = self.registry.resolve(&self.lease_path(&path)?)?;
                Ok(Reply::Property {
                    name: property.to_string(),
                    value: lease.property(property),
                })
            }
            Request::Describe { path } => {
                let lease = self.registry.resolve(&self.lease_path(&path)?)?;
                Ok(Reply::Lease {
                    path: self.paths.lease_path(lease.id()),
                    lease: lease.info(),
                })
            }
            Request::List => Ok(Reply::Leases {
                leases: self.registry.leases().iter().map(|l| l.info()).collect(),
            }),
            Request::Stats => Ok(Reply::Stats {
                leases: self.registry.len(),
                stats: self.registry.stats(),
            }),
        }
    }

    /// Parses a path that must name a lease; anything else is `NotFound`.
    fn lease_path(&self, path: &str) -> Result<ObjectPath, Fault> {
        match self.paths.parse(path) {
            Ok(ObjectPath::Manager) | Err(_) => Err(Fault::new(
                FaultKind::NotFound,
                format!("no lease object at '{path}'"),
            )),
            Ok(target) => Ok(target),
        }
    }
}
