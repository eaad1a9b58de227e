// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # uidalloc-service
//!
//! The long-running lease daemon and its client.
//!
//! - [`ServiceConfig`]: socket, object root and pool geometry from TOML.
//! - [`protocol`]: line-delimited JSON requests and responses.
//! - [`Facade`]: decodes requests and runs them against the
//!   [`LeaseRegistry`](lease_registry::LeaseRegistry).
//! - [`Daemon`]: Unix socket listener; one task owns the facade and every
//!   connection forwards requests to it over a channel.
//! - [`Client`]: async client used by the command-line tool.

mod client;
mod config;
mod error;
mod facade;
pub mod protocol;
mod server;

pub use client::{Allocation, Client};
pub use config::{ServiceConfig, SOCKET_NAME};
pub use error::ServiceError;
pub use facade::Facade;
pub use server::{serve, Daemon};
