// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-size-class free lists of chunk ids.
//!
//! Each size class owns a doubly-linked list of free leaves. The links are
//! kept in a side table indexed by [`ChunkId`], not inside the chunks, so a
//! chunk is in at most one list and removing a known member (a buddy being
//! coalesced) is O(1), as are push and pop at either end.

use crate::ChunkId;

#[derive(Debug, Clone, Copy, Default)]
struct Ends {
    head: Option<ChunkId>,
    tail: Option<ChunkId>,
    len: usize,
}

#[derive(Debug, Clone, Copy)]
struct Link {
    size_class: u32,
    prev: Option<ChunkId>,
    next: Option<ChunkId>,
}

/// One free list per size class `1..=max_exp`.
#[derive(Debug)]
pub struct FreeLists {
    classes: Vec<Ends>,
    links: Vec<Option<Link>>,
}

impl FreeLists {
    /// Creates empty lists for size classes `1..=max_exp`.
    pub fn new(max_exp: u32) -> Self {
        Self {
            classes: vec![Ends::default(); max_exp as usize],
            links: Vec::new(),
        }
    }

    /// Highest size class tracked.
    pub fn max_exp(&self) -> u32 {
        self.classes.len() as u32
    }

    /// Inserts `id` at the head of its class list.
    pub fn push_front(&mut self, size_class: u32, id: ChunkId) {
        let ends = self.ends(size_class);
        let old_head = ends.head;
        self.set_link(
            id,
            Link {
                size_class,
                prev: None,
                next: old_head,
            },
        );
        match old_head {
            Some(h) => self.link_mut(h).prev = Some(id),
            None => self.ends_mut(size_class).tail = Some(id),
        }
        let ends = self.ends_mut(size_class);
        ends.head = Some(id);
        ends.len += 1;
    }

    /// Inserts `id` at the tail of its class list.
    pub fn push_back(&mut self, size_class: u32, id: ChunkId) {
        let ends = self.ends(size_class);
        let old_tail = ends.tail;
        self.set_link(
            id,
            Link {
                size_class,
                prev: old_tail,
                next: None,
            },
        );
        match old_tail {
            Some(t) => self.link_mut(t).next = Some(id),
            None => self.ends_mut(size_class).head = Some(id),
        }
        let ends = self.ends_mut(size_class);
        ends.tail = Some(id);
        ends.len += 1;
    }

    /// Removes and returns the head of a class list.
    pub fn pop_front(&mut self, size_class: u32) -> Option<ChunkId> {
        let head = self.classes.get(class_index(size_class)?)?.head?;
        self.remove(head);
        Some(head)
    }

    /// Removes and returns the tail of a class list.
    pub fn pop_back(&mut self, size_class: u32) -> Option<ChunkId> {
        let tail = self.classes.get(class_index(size_class)?)?.tail?;
        self.remove(tail);
        Some(tail)
    }

    /// Unlinks `id` from whichever list holds it.
    ///
    /// Returns `false` if the chunk was not on any list.
    pub fn remove(&mut self, id: ChunkId) -> bool {
        let Some(link) = self.links.get_mut(id.index()).and_then(Option::take) else {
            return false;
        };

        match link.prev {
            Some(p) => self.link_mut(p).next = link.next,
            None => self.ends_mut(link.size_class).head = link.next,
        }
        match link.next {
            Some(n) => self.link_mut(n).prev = link.prev,
            None => self.ends_mut(link.size_class).tail = link.prev,
        }
        self.ends_mut(link.size_class).len -= 1;
        true
    }

    /// Whether `id` is on any free list.
    pub fn contains(&self, id: ChunkId) -> bool {
        matches!(self.links.get(id.index()), Some(Some(_)))
    }

    /// Size class of the list holding `id`, if any.
    pub fn class_of(&self, id: ChunkId) -> Option<u32> {
        self.links
            .get(id.index())
            .and_then(|l| l.as_ref())
            .map(|l| l.size_class)
    }

    /// Number of free blocks of a size class.
    pub fn len(&self, size_class: u32) -> usize {
        class_index(size_class)
            .and_then(|i| self.classes.get(i))
            .map_or(0, |e| e.len)
    }

    /// Whether a size class has no free blocks.
    pub fn is_empty(&self, size_class: u32) -> bool {
        self.len(size_class) == 0
    }

    /// Free block counts, indexed by `size_class - 1`.
    pub fn counts(&self) -> Vec<usize> {
        self.classes.iter().map(|e| e.len).collect()
    }

    /// Iterates over the free chunks of one size class, head first.
    pub fn iter(&self, size_class: u32) -> FreeListIter<'_> {
        let current = class_index(size_class)
            .and_then(|i| self.classes.get(i))
            .and_then(|e| e.head);
        FreeListIter {
            lists: self,
            current,
        }
    }

    fn ends(&self, size_class: u32) -> Ends {
        match class_index(size_class).and_then(|i| self.classes.get(i)) {
            Some(ends) => *ends,
            None => panic!(
                "size class {size_class} outside 1..={}",
                self.classes.len()
            ),
        }
    }

    fn ends_mut(&mut self, size_class: u32) -> &mut Ends {
        let max = self.classes.len();
        match class_index(size_class).and_then(|i| self.classes.get_mut(i)) {
            Some(ends) => ends,
            None => panic!("size class {size_class} outside 1..={max}"),
        }
    }

    fn set_link(&mut self, id: ChunkId, link: Link) {
        let i = id.index();
        if self.links.len() <= i {
            self.links.resize(i + 1, None);
        }
        debug_assert!(self.links[i].is_none(), "chunk already on a free list");
        self.links[i] = Some(link);
    }

    fn link_mut(&mut self, id: ChunkId) -> &mut Link {
        match self.links.get_mut(id.index()).and_then(Option::as_mut) {
            Some(link) => link,
            None => panic!("free list corrupted: chunk {id:?} is linked but not listed"),
        }
    }
}

fn class_index(size_class: u32) -> Option<usize> {
    (size_class as usize).checked_sub(1)
}

/// Iterator over one free list.
pub struct FreeListIter<'a> {
    lists: &'a FreeLists,
    current: Option<ChunkId>,
}

impl Iterator for FreeListIter<'_> {
    type Item = ChunkId;

    fn next(&mut self) -> Option<ChunkId> {
        let id = self.current?;
        self.current = self
            .lists
            .links
            .get(id.index())
            .and_then(|l| l.as_ref())
            .and_then(|l| l.next);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChunkTree;

    fn ids(n: usize) -> Vec<ChunkId> {
        let mut tree = ChunkTree::new();
        (0..n).map(|i| tree.add_root(i as u64, 1)).collect()
    }

    #[test]
    fn test_push_pop_front() {
        let ids = ids(3);
        let mut lists = FreeLists::new(4);

        lists.push_front(2, ids[0]);
        lists.push_front(2, ids[1]);
        lists.push_front(2, ids[2]);

        assert_eq!(lists.len(2), 3);
        assert_eq!(lists.pop_front(2), Some(ids[2]));
        assert_eq!(lists.pop_front(2), Some(ids[1]));
        assert_eq!(lists.pop_front(2), Some(ids[0]));
        assert_eq!(lists.pop_front(2), None);
        assert!(lists.is_empty(2));
    }

    #[test]
    fn test_push_back_keeps_order() {
        let ids = ids(4);
        let mut lists = FreeLists::new(4);
        for &id in &ids {
            lists.push_back(4, id);
        }
        let order: Vec<_> = lists.iter(4).collect();
        assert_eq!(order, ids);
        assert_eq!(lists.pop_back(4), Some(ids[3]));
        assert_eq!(lists.pop_front(4), Some(ids[0]));
        assert_eq!(lists.len(4), 2);
    }

    #[test]
    fn test_remove_middle() {
        let ids = ids(3);
        let mut lists = FreeLists::new(1);
        for &id in &ids {
            lists.push_back(1, id);
        }

        assert!(lists.remove(ids[1]));
        assert!(!lists.contains(ids[1]));
        assert!(!lists.remove(ids[1]));

        let order: Vec<_> = lists.iter(1).collect();
        assert_eq!(order, vec![ids[0], ids[2]]);
        assert_eq!(lists.len(1), 2);
    }

    #[test]
    fn test_remove_ends() {
        let ids = ids(3);
        let mut lists = FreeLists::new(1);
        for &id in &ids {
            lists.push_back(1, id);
        }
        assert!(lists.remove(ids[0]));
        assert!(lists.remove(ids[2]));
        assert_eq!(lists.iter(1).collect::<Vec<_>>(), vec![ids[1]]);
        assert!(lists.remove(ids[1]));
        assert!(lists.is_empty(1));
        assert_eq!(lists.pop_back(1), None);
    }

    #[test]
    fn test_classes_are_independent() {
        let ids = ids(2);
        let mut lists = FreeLists::new(3);
        lists.push_front(1, ids[0]);
        lists.push_front(3, ids[1]);

        assert_eq!(lists.counts(), vec![1, 0, 1]);
        assert_eq!(lists.class_of(ids[1]), Some(3));
        assert_eq!(lists.pop_front(2), None);
    }

    #[test]
    fn test_out_of_range_queries() {
        let lists = FreeLists::new(2);
        assert_eq!(lists.len(0), 0);
        assert_eq!(lists.len(9), 0);
        assert_eq!(lists.iter(9).count(), 0);
    }
}
