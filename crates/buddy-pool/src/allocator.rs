// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The buddy allocator.
//!
//! [`BuddyAllocator`] hands out power-of-two blocks of ids:
//!
//! 1. `get(size_class)` pops the head of the matching free list. When that
//!    list is empty it borrows a block one class up (recursively), splits it,
//!    keeps the low half and pushes the high half onto the free list.
//! 2. `put(chunk)` returns a block. If its buddy is a free leaf the pair is
//!    coalesced into the parent, which is then returned the same way; the
//!    cascade stops at the first busy buddy or at a root.
//!
//! Splitting is lazy: a request performs exactly as many splits as needed to
//! reach its size class. A failed request never mutates the pool.
//!
//! The allocator is a plain value. It takes `&mut self` everywhere and has no
//! interior mutability; callers serialize access.

use crate::{block_len, Chunk, ChunkId, ChunkTree, FreeLists, PoolConfig, PoolError, PoolStats};

/// Smallest size class whose blocks hold at least `request` ids.
///
/// Returns [`PoolError::InvalidSize`] for a zero-sized request. The result is
/// not bounded by any pool's maximum; [`BuddyAllocator::get`] rejects classes
/// that are too large.
///
/// # Examples
/// ```
/// use buddy_pool::size_class_for;
///
/// assert_eq!(size_class_for(1).unwrap(), 1);
/// assert_eq!(size_class_for(100).unwrap(), 8); // 128-id block
/// assert_eq!(size_class_for(128).unwrap(), 8);
/// assert_eq!(size_class_for(129).unwrap(), 9);
/// assert!(size_class_for(0).is_err());
/// ```
pub fn size_class_for(request: u64) -> Result<u32, PoolError> {
    if request == 0 {
        return Err(PoolError::InvalidSize);
    }
    // Bits needed to represent `request - 1`, plus one: 2^(class-1) >= request.
    Ok(u64::BITS - (request - 1).leading_zeros() + 1)
}

/// Buddy-system allocator over a contiguous id range.
///
/// # Example
/// ```
/// use buddy_pool::{BuddyAllocator, PoolConfig};
///
/// let mut pool = BuddyAllocator::new(PoolConfig::new(0, 1023, 8)).unwrap();
///
/// let a = pool.get(3).unwrap(); // 4 ids
/// assert_eq!(pool.chunk(a).unwrap().start(), 0);
/// assert_eq!(pool.chunk(a).unwrap().len(), 4);
///
/// pool.put(a);
/// assert_eq!(pool.free_blocks(8), 8);
/// ```
#[derive(Debug)]
pub struct BuddyAllocator {
    config: PoolConfig,
    tree: ChunkTree,
    free: FreeLists,
    stats: PoolStats,
}

impl BuddyAllocator {
    /// Builds a pool covering `config`'s range with every top-level block free.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let roots = config.root_count()?;
        let total = config.capacity()?;
        let top = config.top_block_len();

        let mut tree = ChunkTree::new();
        let mut free = FreeLists::new(config.max_exp);
        for i in 0..roots {
            let start = config.start + i * top;
            let id = tree.add_root(start, config.max_exp);
            free.push_back(config.max_exp, id);
            tracing::debug!(
                "initial chunk {}: start {start:#x} class {} ({top} ids)",
                i + 1,
                config.max_exp
            );
        }
        tracing::info!("pool ready: {config}, {roots} top-level blocks");

        Ok(Self {
            config,
            tree,
            free,
            stats: PoolStats {
                total_ids: total,
                free_ids: total,
                ..PoolStats::default()
            },
        })
    }

    /// The geometry this pool was built from.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Largest size class this pool can hand out.
    pub fn max_exp(&self) -> u32 {
        self.config.max_exp
    }

    /// Hands out a free block of exactly `size_class`.
    ///
    /// Fails with [`PoolError::SizeTooLarge`] above the pool's top class and
    /// with [`PoolError::PoolExhausted`] when no block of this class or any
    /// larger one is free. Failure leaves the pool untouched.
    pub fn get(&mut self, size_class: u32) -> Result<ChunkId, PoolError> {
        if size_class == 0 {
            return Err(PoolError::InvalidSize);
        }
        if size_class > self.max_exp() {
            return Err(PoolError::SizeTooLarge {
                size_class,
                max_exp: self.max_exp(),
            });
        }

        let Some(id) = self.take(size_class) else {
            self.stats.record_exhausted();
            tracing::warn!("pool exhausted at size class {size_class}");
            return Err(PoolError::PoolExhausted { size_class });
        };

        self.tree.set_allocated(id, true);
        self.stats.record_allocation(block_len(size_class));

        let chunk = &self.tree[id];
        tracing::debug!(
            "allocated chunk: start {:#x} class {} ({} ids)",
            chunk.start(),
            chunk.size_class(),
            chunk.len()
        );
        Ok(id)
    }

    /// Returns an allocated block to the pool, coalescing with free buddies.
    ///
    /// Ids that do not name an allocated leaf are ignored with a warning.
    pub fn put(&mut self, id: ChunkId) {
        let Some(chunk) = self.tree.get(id) else {
            tracing::warn!("release of unknown chunk {id:?} ignored");
            return;
        };
        if !chunk.is_leaf() || !chunk.is_allocated() {
            tracing::warn!(
                "release of chunk at {:#x} (class {}) that is not an allocated leaf ignored",
                chunk.start(),
                chunk.size_class()
            );
            return;
        }

        tracing::debug!(
            "freeing chunk: start {:#x} class {} ({} ids)",
            chunk.start(),
            chunk.size_class(),
            chunk.len()
        );
        self.stats.record_release(chunk.len());
        self.coalesce(id);
    }

    /// Looks up a chunk handed out by this pool.
    pub fn chunk(&self, id: ChunkId) -> Option<&Chunk> {
        self.tree.get(id)
    }

    /// The partition tree.
    pub fn tree(&self) -> &ChunkTree {
        &self.tree
    }

    /// The per-class free lists.
    pub fn free_lists(&self) -> &FreeLists {
        &self.free
    }

    /// Number of free blocks of one size class.
    pub fn free_blocks(&self, size_class: u32) -> usize {
        self.free.len(size_class)
    }

    /// Free block counts, indexed by `size_class - 1`.
    pub fn free_counts(&self) -> Vec<usize> {
        self.free.counts()
    }

    /// Current statistics.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            free_blocks: self.free.counts(),
            ..self.stats.clone()
        }
    }

    /// Pops or carves out a free leaf of `size_class` without marking it.
    fn take(&mut self, size_class: u32) -> Option<ChunkId> {
        if let Some(id) = self.free.pop_front(size_class) {
            return Some(id);
        }
        if size_class >= self.max_exp() {
            return None;
        }

        let parent = self.take(size_class + 1)?;
        {
            let p = &self.tree[parent];
            tracing::debug!(
                "splitting chunk: start {:#x} class {} ({} ids)",
                p.start(),
                p.size_class(),
                p.len()
            );
        }
        let [low, high] = self.tree.split(parent);
        self.stats.record_split();
        self.free.push_front(size_class, high);
        Some(low)
    }

    /// Marks `id` free and either merges it with its buddy or lists it.
    fn coalesce(&mut self, id: ChunkId) {
        self.tree.set_allocated(id, false);

        let chunk = &self.tree[id];
        let size_class = chunk.size_class();

        if let (Some(parent), Some(buddy)) = (chunk.parent(), self.tree.buddy(id)) {
            let b = &self.tree[buddy];
            if b.is_leaf() && !b.is_allocated() {
                self.free.remove(buddy);
                self.free.remove(id);
                self.tree.merge(parent);
                self.stats.record_merge();

                let p = &self.tree[parent];
                tracing::debug!(
                    "merging chunk: start {:#x} class {} ({} ids)",
                    p.start(),
                    p.size_class(),
                    p.len()
                );
                self.coalesce(parent);
                return;
            }
        }

        self.free.push_front(size_class, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2048 ids in sixteen 128-id roots.
    fn small_pool() -> BuddyAllocator {
        BuddyAllocator::new(PoolConfig::new(0, 2047, 8)).unwrap()
    }

    #[test]
    fn test_size_class_for() {
        assert_eq!(size_class_for(1).unwrap(), 1);
        assert_eq!(size_class_for(2).unwrap(), 2);
        assert_eq!(size_class_for(3).unwrap(), 3);
        assert_eq!(size_class_for(4).unwrap(), 3);
        assert_eq!(size_class_for(5).unwrap(), 4);
        assert_eq!(size_class_for(100).unwrap(), 8);
        assert_eq!(size_class_for(1 << 27).unwrap(), 28);
        assert_eq!(size_class_for((1 << 27) + 1).unwrap(), 29);
        assert_eq!(size_class_for(u64::MAX).unwrap(), 65);
        assert_eq!(size_class_for(0), Err(PoolError::InvalidSize));
    }

    #[test]
    fn test_initial_state() {
        let pool = small_pool();
        assert_eq!(pool.free_blocks(8), 16);
        assert_eq!(pool.tree().roots().len(), 16);
        assert_eq!(pool.stats().free_ids, 2048);
        for class in 1..8 {
            assert_eq!(pool.free_blocks(class), 0);
        }
    }

    #[test]
    fn test_get_top_class_takes_first_root() {
        let mut pool = small_pool();
        let id = pool.get(8).unwrap();
        let chunk = pool.chunk(id).unwrap();
        assert_eq!(chunk.start(), 0);
        assert!(chunk.is_allocated());
        assert_eq!(pool.free_blocks(8), 15);
    }

    #[test]
    fn test_split_down() {
        let mut pool = small_pool();
        let id = pool.get(1).unwrap();
        assert_eq!(pool.chunk(id).unwrap().start(), 0);

        // One buddy left free at every class between 1 and 7.
        for class in 1..8 {
            assert_eq!(pool.free_blocks(class), 1, "class {class}");
        }
        assert_eq!(pool.free_blocks(8), 15);
        assert_eq!(pool.stats().splits, 7);
    }

    #[test]
    fn test_second_request_takes_buddy() {
        let mut pool = small_pool();
        let a = pool.get(2).unwrap();
        let b = pool.get(2).unwrap();
        assert_eq!(pool.chunk(a).unwrap().start(), 0);
        assert_eq!(pool.chunk(b).unwrap().start(), 2);
        assert_eq!(pool.tree().buddy(a), Some(b));
    }

    #[test]
    fn test_put_coalesces_to_root() {
        let mut pool = small_pool();
        let a = pool.get(1).unwrap();
        let b = pool.get(1).unwrap();

        pool.put(a);
        assert_eq!(pool.free_blocks(1), 1);

        pool.put(b);
        assert_eq!(pool.free_blocks(8), 16);
        for class in 1..8 {
            assert_eq!(pool.free_blocks(class), 0);
        }
        assert_eq!(pool.tree().len(), 16);
        assert_eq!(pool.stats().merges, 7);
    }

    #[test]
    fn test_no_merge_with_split_buddy() {
        let mut pool = small_pool();
        // a = [0,64), then [64,128) is split for b and c.
        let a = pool.get(7).unwrap();
        let b = pool.get(6).unwrap();
        let c = pool.get(6).unwrap();
        assert_eq!(pool.chunk(b).unwrap().start(), 64);
        assert_eq!(pool.chunk(c).unwrap().start(), 96);

        // a's buddy is an inner node: no merge.
        pool.put(a);
        assert_eq!(pool.free_blocks(7), 1);
        assert_eq!(pool.free_blocks(8), 15);

        pool.put(b);
        pool.put(c);
        assert_eq!(pool.free_blocks(8), 16);
        assert_eq!(pool.free_blocks(7), 0);
        assert_eq!(pool.free_blocks(6), 0);
    }

    #[test]
    fn test_size_too_large() {
        let mut pool = small_pool();
        assert_eq!(
            pool.get(9),
            Err(PoolError::SizeTooLarge {
                size_class: 9,
                max_exp: 8
            })
        );
        assert_eq!(pool.get(0), Err(PoolError::InvalidSize));
    }

    #[test]
    fn test_exhaustion_leaves_pool_untouched() {
        let mut pool = BuddyAllocator::new(PoolConfig::new(0, 255, 8)).unwrap();
        let _a = pool.get(8).unwrap();
        let b = pool.get(7).unwrap();
        let _c = pool.get(7).unwrap();

        let before = pool.free_counts();
        let chunks = pool.tree().len();
        assert_eq!(pool.get(1), Err(PoolError::PoolExhausted { size_class: 1 }));
        assert_eq!(pool.free_counts(), before);
        assert_eq!(pool.tree().len(), chunks);
        assert_eq!(pool.stats().exhausted, 1);

        pool.put(b);
        assert!(pool.get(1).is_ok());
    }

    #[test]
    fn test_double_put_is_ignored() {
        let mut pool = small_pool();
        let a = pool.get(3).unwrap();
        let _keep = pool.get(3).unwrap();
        pool.put(a);
        let counts = pool.free_counts();
        pool.put(a);
        assert_eq!(pool.free_counts(), counts);
        assert_eq!(pool.stats().releases, 1);
    }

    #[test]
    fn test_put_inner_chunk_is_ignored() {
        let mut pool = small_pool();
        let a = pool.get(1).unwrap();
        let parent = pool.chunk(a).unwrap().parent().unwrap();
        let counts = pool.free_counts();
        pool.put(parent);
        assert_eq!(pool.free_counts(), counts);
    }

    #[test]
    fn test_stats_accounting() {
        let mut pool = small_pool();
        let a = pool.get(8).unwrap();
        let b = pool.get(5).unwrap();
        let stats = pool.stats();
        assert_eq!(stats.allocated_ids, 128 + 16);
        assert_eq!(stats.free_ids, 2048 - 144);
        assert_eq!(stats.free_blocks.len(), 8);

        pool.put(a);
        pool.put(b);
        let stats = pool.stats();
        assert_eq!(stats.allocated_ids, 0);
        assert_eq!(stats.peak_allocated_ids, 144);
        assert_eq!(stats.allocations, 2);
        assert_eq!(stats.releases, 2);
    }
}
