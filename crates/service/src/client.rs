// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Async client for the daemon socket.

use crate::protocol::{Reply, Request, Response};
use crate::ServiceError;
use buddy_pool::PoolStats;
use lease_registry::{LeaseInfo, PropertyValue};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;

/// Result of a successful allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub path: String,
    pub start: u64,
    pub length: u64,
}

/// One connection to the daemon. Requests are answered in order.
pub struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    write: OwnedWriteHalf,
    socket_path: PathBuf,
}

impl Client {
    pub async fn connect(socket_path: &Path) -> Result<Self, ServiceError> {
        let stream = UnixStream::connect(socket_path)
            .await
            .map_err(|e| ServiceError::io(socket_path, e))?;
        let (read, write) = stream.into_split();
        Ok(Self {
            lines: BufReader::new(read).lines(),
            write,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Sends one request and waits for its response line.
    pub async fn call(&mut self, request: &Request) -> Result<Response, ServiceError> {
        let mut line = serde_json::to_string(request)?;
        line.push('\n');
        self.write
            .write_all(line.as_bytes())
            .await
            .map_err(|e| ServiceError::io(&self.socket_path, e))?;

        let reply = self
            .lines
            .next_line()
            .await
            .map_err(|e| ServiceError::io(&self.socket_path, e))?
            .ok_or(ServiceError::Disconnected)?;
        Ok(serde_json::from_str(&reply)?)
    }

    /// Like [`Client::call`], with faults returned as [`ServiceError::Fault`].
    pub async fn request(&mut self, request: &Request) -> Result<Reply, ServiceError> {
        self.call(request)
            .await?
            .into_result()
            .map_err(ServiceError::Fault)
    }

    pub async fn allocate(
        &mut self,
        size: u64,
        alias: &str,
        persistent: bool,
    ) -> Result<Allocation, ServiceError> {
        let request = Request::Allocate {
            alias: alias.to_string(),
            size,
            persistent,
        };
        match self.request(&request).await? {
            Reply::Allocated {
                path,
                start,
                length,
            } => Ok(Allocation {
                path,
                start,
                length,
            }),
            other => Err(unexpected(other)),
        }
    }

    pub async fn release(&mut self, path: &str) -> Result<LeaseInfo, ServiceError> {
        let request = Request::Release {
            path: path.to_string(),
        };
        match self.request(&request).await? {
            Reply::Released { lease } => Ok(lease),
            other => Err(unexpected(other)),
        }
    }

    pub async fn get(&mut self, path: &str, property: &str) -> Result<PropertyValue, ServiceError> {
        let request = Request::Get {
            path: path.to_string(),
            property: property.to_string(),
        };
        match self.request(&request).await? {
            Reply::Property { value, .. } => Ok(value),
            other => Err(unexpected(other)),
        }
    }

    /// Every property of a lease, with its canonical path.
    pub async fn describe(&mut self, path: &str) -> Result<(String, LeaseInfo), ServiceError> {
        let request = Request::Describe {
            path: path.to_string(),
        };
        match self.request(&request).await? {
            Reply::Lease { path, lease } => Ok((path, lease)),
            other => Err(unexpected(other)),
        }
    }

    pub async fn list(&mut self) -> Result<Vec<LeaseInfo>, ServiceError> {
        match self.request(&Request::List).await? {
            Reply::Leases { leases } => Ok(leases),
            other => Err(unexpected(other)),
        }
    }

    /// Live lease count and pool statistics.
    pub async fn stats(&mut self) -> Result<(usize, PoolStats), ServiceError> {
        match self.request(&Request::Stats).await? {
            Reply::Stats { leases, stats } => Ok((leases, stats)),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(reply: Reply) -> ServiceError {
    ServiceError::UnexpectedReply(format!("{reply:?}"))
}
