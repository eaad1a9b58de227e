// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # lease-registry
//!
//! Leases of id ranges on top of [`buddy_pool`]. Every lease gets a
//! generated identifier derived from its block, and optionally a
//! client-chosen alias; either name releases it.
//!
//! # Example
//! ```
//! use buddy_pool::{BuddyAllocator, PoolConfig};
//! use lease_registry::LeaseRegistry;
//!
//! let pool = BuddyAllocator::new(PoolConfig::default()).unwrap();
//! let mut registry = LeaseRegistry::new(pool);
//!
//! let lease = registry.allocate(65536, "build-42", false).unwrap();
//! assert_eq!(lease.start(), 1 << 31);
//! assert_eq!(lease.size(), 65536);
//! assert_eq!(lease.id().as_str(), "11_0000000080000000");
//!
//! registry.release("build-42").unwrap();
//! assert!(registry.is_empty());
//! ```

mod error;
mod lease;
mod path;
mod registry;

pub use error::LeaseError;
pub use lease::{Lease, LeaseId, LeaseInfo, LeaseProperty, PropertyValue};
pub use path::{ObjectPath, PathScheme};
pub use registry::{validate_alias, LeaseRegistry};
