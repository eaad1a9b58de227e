// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Pool geometry: the managed ID range and the largest block size class.
//!
//! The range `[start, end]` is inclusive on both ends and is carved into
//! equally sized top-level blocks of `2^(max_exp - 1)` ids. The range length
//! must therefore be a positive multiple of that block length.
//!
//! # TOML Format
//! ```toml
//! start = 2147483648
//! end = 4294967295
//! max_exp = 28
//! ```

use crate::{block_len, PoolError};
use std::fmt;

/// Default first id of the pool (`1 << 31`).
pub const DEFAULT_POOL_START: u64 = 1 << 31;

/// Default last id of the pool, inclusive.
pub const DEFAULT_POOL_END: u64 = u32::MAX as u64;

/// Default largest size class; top-level blocks hold `2^27` ids.
pub const DEFAULT_MAX_EXP: u32 = 28;

/// Largest size class the allocator accepts.
pub const MAX_SUPPORTED_EXP: u32 = 63;

/// Geometry of a buddy pool.
///
/// # Examples
/// ```
/// use buddy_pool::PoolConfig;
///
/// let config = PoolConfig::default();
/// assert_eq!(config.capacity().unwrap(), 1 << 31);
/// assert_eq!(config.root_count().unwrap(), 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// First id in the pool.
    pub start: u64,
    /// Last id in the pool (inclusive).
    pub end: u64,
    /// Size class of the top-level blocks.
    pub max_exp: u32,
}

impl PoolConfig {
    /// Creates a configuration without validating it.
    pub fn new(start: u64, end: u64, max_exp: u32) -> Self {
        Self {
            start,
            end,
            max_exp,
        }
    }

    /// Length of a top-level block.
    pub fn top_block_len(&self) -> u64 {
        block_len(self.max_exp)
    }

    /// Number of ids in the pool.
    pub fn capacity(&self) -> Result<u64, PoolError> {
        if self.end < self.start {
            return Err(PoolError::InvalidConfig(format!(
                "pool end {:#x} lies before pool start {:#x}",
                self.end, self.start
            )));
        }
        (self.end - self.start).checked_add(1).ok_or_else(|| {
            PoolError::InvalidConfig("pool range covers the whole 64-bit space".into())
        })
    }

    /// Number of top-level blocks the range is carved into.
    pub fn root_count(&self) -> Result<u64, PoolError> {
        self.validate()?;
        Ok(self.capacity()? / self.top_block_len())
    }

    /// Checks that the geometry describes a usable pool.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.max_exp == 0 || self.max_exp > MAX_SUPPORTED_EXP {
            return Err(PoolError::InvalidConfig(format!(
                "max_exp {} outside 1..={MAX_SUPPORTED_EXP}",
                self.max_exp
            )));
        }

        let capacity = self.capacity()?;
        let top = self.top_block_len();
        if capacity % top != 0 {
            return Err(PoolError::InvalidConfig(format!(
                "pool length {capacity} is not a multiple of the top block length {top}"
            )));
        }
        if self.start % top != 0 {
            return Err(PoolError::InvalidConfig(format!(
                "pool start {:#x} is not aligned to the top block length {top}",
                self.start
            )));
        }

        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            start: DEFAULT_POOL_START,
            end: DEFAULT_POOL_END,
            max_exp: DEFAULT_MAX_EXP,
        }
    }
}

impl fmt::Display for PoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:#x}, {:#x}] in blocks of {} ids (class {})",
            self.start,
            self.end,
            self.top_block_len(),
            self.max_exp
        )
    }
}
