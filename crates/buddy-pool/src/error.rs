// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the buddy pool.

/// Errors returned by the pool allocator and its configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// A zero-sized request, or a size class below 1.
    #[error("invalid size: allocations must cover at least one id")]
    InvalidSize,

    /// The request needs a block larger than the pool's top size class.
    #[error("size class {size_class} exceeds the maximum block size class {max_exp}")]
    SizeTooLarge { size_class: u32, max_exp: u32 },

    /// No free block of the requested size class or larger remains.
    #[error("pool exhausted: no free block of size class {size_class} or larger")]
    PoolExhausted { size_class: u32 },

    /// The pool configuration is unusable.
    #[error("invalid pool configuration: {0}")]
    InvalidConfig(String),
}
