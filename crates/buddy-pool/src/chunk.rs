// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The chunk tree: a binary partition of the id space held in an arena.
//!
//! Every block of the pool is a [`Chunk`]. Top-level chunks (roots) have no
//! parent. Splitting a leaf creates exactly two children of the next smaller
//! size class; merging removes both again. Chunks are addressed by
//! [`ChunkId`], an index into the arena, so parent/child links are plain
//! indices rather than pointers. Vacated slots are reused by later splits.
//!
//! ```text
//!            [start, start+len)                 class c
//!              /            \
//!   [start, start+len/2)  [start+len/2, start+len)   class c-1
//! ```

use std::ops::Index;

/// Length in ids of a block of the given size class: `2^(size_class - 1)`.
///
/// Returns 0 for size classes outside `1..=64`.
pub const fn block_len(size_class: u32) -> u64 {
    if size_class == 0 || size_class > 64 {
        0
    } else {
        1u64 << (size_class - 1)
    }
}

/// Stable handle of a chunk inside a [`ChunkTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(usize);

impl ChunkId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// A node of the partition tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    start: u64,
    size_class: u32,
    allocated: bool,
    parent: Option<ChunkId>,
    children: Option<[ChunkId; 2]>,
}

impl Chunk {
    /// First id covered by this chunk.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Last id covered by this chunk (inclusive).
    pub fn end(&self) -> u64 {
        self.start + (self.len() - 1)
    }

    /// Number of ids covered.
    pub fn len(&self) -> u64 {
        block_len(self.size_class)
    }

    /// Size class (block length exponent plus one).
    pub fn size_class(&self) -> u32 {
        self.size_class
    }

    /// Whether the chunk is currently handed out.
    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    /// Whether the chunk has not been split.
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// The chunk this one was split from, if any.
    pub fn parent(&self) -> Option<ChunkId> {
        self.parent
    }

    /// Low and high halves, if the chunk has been split.
    pub fn children(&self) -> Option<[ChunkId; 2]> {
        self.children
    }
}

/// Arena owning every live chunk of a pool.
#[derive(Debug, Default)]
pub struct ChunkTree {
    slots: Vec<Option<Chunk>>,
    vacant: Vec<usize>,
    roots: Vec<ChunkId>,
    live: usize,
}

impl ChunkTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a top-level chunk covering `[start, start + block_len(size_class))`.
    pub fn add_root(&mut self, start: u64, size_class: u32) -> ChunkId {
        let id = self.insert(Chunk {
            start,
            size_class,
            allocated: false,
            parent: None,
            children: None,
        });
        self.roots.push(id);
        id
    }

    /// Top-level chunks in address order.
    pub fn roots(&self) -> &[ChunkId] {
        &self.roots
    }

    /// Returns the chunk behind `id`, or `None` for a vacated slot.
    pub fn get(&self, id: ChunkId) -> Option<&Chunk> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Number of live chunks (leaves and inner nodes).
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether the tree holds no chunks at all.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterates over every live chunk.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkId, &Chunk)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|c| (ChunkId(i), c)))
    }

    /// Iterates over the leaves only.
    pub fn leaves(&self) -> impl Iterator<Item = (ChunkId, &Chunk)> + '_ {
        self.iter().filter(|(_, c)| c.is_leaf())
    }

    /// The other half of the split that produced `id`.
    pub fn buddy(&self, id: ChunkId) -> Option<ChunkId> {
        let parent = self.get(id)?.parent?;
        let [low, high] = self.get(parent)?.children?;
        Some(if low == id { high } else { low })
    }

    pub(crate) fn set_allocated(&mut self, id: ChunkId, allocated: bool) {
        if let Some(chunk) = self.slot_mut(id) {
            chunk.allocated = allocated;
        }
    }

    /// Splits a free leaf into its two halves and returns `[low, high]`.
    pub(crate) fn split(&mut self, id: ChunkId) -> [ChunkId; 2] {
        let (start, size_class) = {
            let parent = &self[id];
            debug_assert!(parent.is_leaf(), "splitting an inner chunk");
            debug_assert!(!parent.allocated, "splitting an allocated chunk");
            debug_assert!(parent.size_class > 1, "splitting a unit chunk");
            (parent.start, parent.size_class - 1)
        };

        let low = self.insert(Chunk {
            start,
            size_class,
            allocated: false,
            parent: Some(id),
            children: None,
        });
        let high = self.insert(Chunk {
            start: start + block_len(size_class),
            size_class,
            allocated: false,
            parent: Some(id),
            children: None,
        });

        if let Some(parent) = self.slot_mut(id) {
            parent.children = Some([low, high]);
        }
        [low, high]
    }

    /// Discards both children of `id`, turning it back into a free leaf.
    pub(crate) fn merge(&mut self, id: ChunkId) {
        let Some(parent) = self.slot_mut(id) else {
            return;
        };
        let Some(children) = parent.children.take() else {
            return;
        };
        parent.allocated = false;

        for child in children {
            debug_assert!(
                self[child].is_leaf() && !self[child].allocated,
                "merging a busy child"
            );
            self.remove(child);
        }
    }

    fn insert(&mut self, chunk: Chunk) -> ChunkId {
        self.live += 1;
        match self.vacant.pop() {
            Some(i) => {
                self.slots[i] = Some(chunk);
                ChunkId(i)
            }
            None => {
                self.slots.push(Some(chunk));
                ChunkId(self.slots.len() - 1)
            }
        }
    }

    fn remove(&mut self, id: ChunkId) -> Option<Chunk> {
        let chunk = self.slots.get_mut(id.0)?.take()?;
        self.vacant.push(id.0);
        self.live -= 1;
        Some(chunk)
    }

    fn slot_mut(&mut self, id: ChunkId) -> Option<&mut Chunk> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }
}

impl Index<ChunkId> for ChunkTree {
    type Output = Chunk;

    fn index(&self, id: ChunkId) -> &Chunk {
        match self.get(id) {
            Some(chunk) => chunk,
            None => panic!("stale chunk id {}", id.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_len() {
        assert_eq!(block_len(1), 1);
        assert_eq!(block_len(8), 128);
        assert_eq!(block_len(28), 1 << 27);
        assert_eq!(block_len(64), 1 << 63);
        assert_eq!(block_len(0), 0);
        assert_eq!(block_len(65), 0);
    }

    #[test]
    fn test_root() {
        let mut tree = ChunkTree::new();
        let root = tree.add_root(0x1000, 5);
        let chunk = &tree[root];
        assert_eq!(chunk.start(), 0x1000);
        assert_eq!(chunk.len(), 16);
        assert_eq!(chunk.end(), 0x100f);
        assert!(chunk.is_leaf());
        assert!(chunk.parent().is_none());
        assert_eq!(tree.roots(), &[root]);
        assert!(tree.buddy(root).is_none());
    }

    #[test]
    fn test_split_halves() {
        let mut tree = ChunkTree::new();
        let root = tree.add_root(256, 8);
        let [low, high] = tree.split(root);

        assert!(!tree[root].is_leaf());
        assert_eq!(tree[low].start(), 256);
        assert_eq!(tree[high].start(), 256 + 64);
        assert_eq!(tree[low].size_class(), 7);
        assert_eq!(tree[high].size_class(), 7);
        assert_eq!(tree[low].parent(), Some(root));
        assert_eq!(tree.buddy(low), Some(high));
        assert_eq!(tree.buddy(high), Some(low));
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.leaves().count(), 2);
    }

    #[test]
    fn test_merge_reuses_slots() {
        let mut tree = ChunkTree::new();
        let root = tree.add_root(0, 4);
        let [low, _] = tree.split(root);
        tree.merge(root);

        assert!(tree[root].is_leaf());
        assert!(tree.get(low).is_none());
        assert_eq!(tree.len(), 1);

        // Vacated slots are handed out again.
        let [a, b] = tree.split(root);
        assert!(a.index() < 3 && b.index() < 3);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    #[should_panic(expected = "stale chunk id")]
    fn test_stale_index_panics() {
        let mut tree = ChunkTree::new();
        let root = tree.add_root(0, 2);
        let [low, _] = tree.split(root);
        tree.merge(root);
        let _ = &tree[low];
    }
}
