// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # buddy-pool
//!
//! A buddy-system allocator for ranges of a 64-bit integer id space, such as
//! blocks of UIDs handed to containers.
//!
//! # Key Components
//!
//! - [`PoolConfig`]: the managed range `[start, end]` and the top size class.
//! - [`ChunkTree`]: arena of [`Chunk`]s forming the binary partition of the
//!   range.
//! - [`FreeLists`]: one list of free leaves per size class.
//! - [`BuddyAllocator`]: `get`/`put` with split-on-demand and
//!   coalesce-on-release.
//! - [`PoolStats`]: occupancy snapshot and cumulative counters.
//!
//! # Size Classes
//!
//! A block of size class `c` holds `2^(c-1)` ids, so class 1 is a single id
//! and class 28 is `2^27` ids. Requests are rounded up with
//! [`size_class_for`].
//!
//! ```text
//! class 8  [0 .................................... 128)
//! class 7  [0 ............... 64) [64 ............ 128)
//! class 6  [0 ... 32) [32 ... 64)
//! ```
//!
//! # Example
//! ```
//! use buddy_pool::{size_class_for, BuddyAllocator, PoolConfig};
//!
//! let mut pool = BuddyAllocator::new(PoolConfig::default()).unwrap();
//!
//! let class = size_class_for(100).unwrap();
//! let a = pool.get(class).unwrap();
//! let b = pool.get(class).unwrap();
//! assert_eq!(pool.chunk(a).unwrap().start(), 1 << 31);
//! assert_eq!(pool.chunk(b).unwrap().start(), (1 << 31) + 128);
//!
//! pool.put(a);
//! pool.put(b);
//! assert_eq!(pool.free_blocks(28), 16);
//! ```

mod allocator;
mod chunk;
pub mod config;
mod error;
mod free_list;
mod stats;

pub use allocator::{size_class_for, BuddyAllocator};
pub use chunk::{block_len, Chunk, ChunkId, ChunkTree};
pub use config::PoolConfig;
pub use error::PoolError;
pub use free_list::{FreeListIter, FreeLists};
pub use stats::PoolStats;
