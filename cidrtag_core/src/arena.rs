//! Index-addressed storage for nodes and tags.

use crate::constants::{ROOT_INDEX, SENTINEL};
use crate::helpers::KeyBits;
use crate::types::{Node, NodeArena, TagArena, TagEntry};
use log::trace;
use std::ops::{Index, IndexMut};

impl<B: KeyBits> Node<B> {
    #[inline]
    pub fn child(&self, bit: u8) -> usize {
        if bit == 0 {
            self.left
        } else {
            self.right
        }
    }

    #[inline]
    pub fn set_child(&mut self, bit: u8, index: usize) {
        if bit == 0 {
            self.left = index;
        } else {
            self.right = index;
        }
    }

    /// Point whichever child slot holds `old` at `new` instead.
    pub fn replace_child(&mut self, old: usize, new: usize) {
        if self.left == old {
            self.left = new;
        } else if self.right == old {
            self.right = new;
        } else {
            debug_assert!(false, "replace_child: {old} is not a child");
        }
    }

    pub fn child_count(&self) -> usize {
        (self.left != SENTINEL) as usize + (self.right != SENTINEL) as usize
    }
}

impl<B: KeyBits> NodeArena<B> {
    /// Arena holding only the sentinel and the root.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.max(2));
        nodes.push(Node::default()); // sentinel
        nodes.push(Node::default()); // root: /0 matches everything
        Self {
            nodes,
            available: Vec::new(),
        }
    }

    /// Hand out a slot for a new node, most-recently-freed first.
    pub fn allocate(&mut self, prefix: B, prefix_len: u8) -> usize {
        let node = Node {
            prefix,
            prefix_len,
            ..Node::default()
        };
        if let Some(index) = self.available.pop() {
            trace!("[ALLOC] Reusing freed node index={}", index);
            self.nodes[index] = node;
            index
        } else {
            self.nodes.push(node);
            self.nodes.len() - 1
        }
    }

    /// Recycle `index`. The caller has already unlinked it and emptied its tags.
    pub fn free(&mut self, index: usize) {
        debug_assert!(index > ROOT_INDEX, "sentinel and root are never freed");
        debug_assert_eq!(self.nodes[index].tag_count, 0);
        trace!("[FREE] node index={}", index);
        self.nodes[index] = Node::default();
        self.available.push(index);
    }

    /// Slots in the arena, including the sentinel and recycled ones.
    pub fn slot_count(&self) -> usize {
        self.nodes.len()
    }

    /// Recycled indices, bottom of the stack first.
    pub fn available_indexes(&self) -> &[usize] {
        &self.available
    }

    pub fn clear(&mut self) {
        self.nodes.truncate(2);
        self.nodes[ROOT_INDEX] = Node::default();
        self.available.clear();
    }
}

impl<B> Index<usize> for NodeArena<B> {
    type Output = Node<B>;

    #[inline]
    fn index(&self, index: usize) -> &Node<B> {
        &self.nodes[index]
    }
}

impl<B> IndexMut<usize> for NodeArena<B> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Node<B> {
        &mut self.nodes[index]
    }
}

impl<T> TagArena<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        let mut entries = Vec::with_capacity(capacity.max(1));
        entries.push(TagEntry {
            value: None,
            next: SENTINEL,
        });
        Self {
            entries,
            available: Vec::new(),
        }
    }

    fn alloc(&mut self, value: T) -> usize {
        let entry = TagEntry {
            value: Some(value),
            next: SENTINEL,
        };
        if let Some(index) = self.available.pop() {
            self.entries[index] = entry;
            index
        } else {
            self.entries.push(entry);
            self.entries.len() - 1
        }
    }

    fn release(&mut self, index: usize) -> Option<T> {
        let entry = &mut self.entries[index];
        entry.next = SENTINEL;
        let value = entry.value.take();
        self.available.push(index);
        value
    }

    #[inline]
    pub fn value(&self, index: usize) -> Option<&T> {
        self.entries.get(index).and_then(|e| e.value.as_ref())
    }

    /// Number of live entries across all lists.
    pub fn live(&self) -> usize {
        self.entries.len() - 1 - self.available.len()
    }

    /// Tags attached to `node`, insertion order.
    pub fn iter<B>(&self, node: &Node<B>) -> Tags<'_, T> {
        Tags {
            arena: self,
            cursor: node.first_tag,
            remaining: node.tag_count,
        }
    }

    /// Append `value` to the end of `node`'s list.
    pub fn push<B>(&mut self, node: &mut Node<B>, value: T) {
        let index = self.alloc(value);
        if node.tag_count == 0 {
            node.first_tag = index;
        } else {
            self.entries[node.last_tag].next = index;
        }
        node.last_tag = index;
        node.tag_count += 1;
    }

    /// Empty `node`'s list, handing back the first value it held.
    pub fn clear_list<B>(&mut self, node: &mut Node<B>) -> Option<T> {
        let mut cursor = node.first_tag;
        let mut first = None;
        while cursor != SENTINEL {
            let next = self.entries[cursor].next;
            let value = self.release(cursor);
            if first.is_none() {
                first = value;
            }
            cursor = next;
        }
        node.first_tag = SENTINEL;
        node.last_tag = SENTINEL;
        node.tag_count = 0;
        first
    }

    /// Drop every entry of `node`'s list for which `doomed` holds, keeping the
    /// survivors in their original order. Returns how many were removed.
    pub fn remove_where<B, F>(&mut self, node: &mut Node<B>, mut doomed: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let mut removed = 0;
        let mut prev = SENTINEL;
        let mut cursor = node.first_tag;
        while cursor != SENTINEL {
            let next = self.entries[cursor].next;
            let hit = self.entries[cursor].value.as_ref().is_some_and(&mut doomed);
            if hit {
                if prev == SENTINEL {
                    node.first_tag = next;
                } else {
                    self.entries[prev].next = next;
                }
                if node.last_tag == cursor {
                    node.last_tag = prev;
                }
                self.release(cursor);
                removed += 1;
            } else {
                prev = cursor;
            }
            cursor = next;
        }
        node.tag_count -= removed;
        removed
    }

    /// Replace, in place, the first entry for which `matches` holds.
    /// Returns false if nothing matched.
    pub fn update_first<B, M, U>(&mut self, node: &Node<B>, mut matches: M, update: U) -> bool
    where
        M: FnMut(&T) -> bool,
        U: FnOnce(&T) -> T,
    {
        let mut cursor = node.first_tag;
        while cursor != SENTINEL {
            let entry = &mut self.entries[cursor];
            if let Some(current) = entry.value.as_ref() {
                if matches(current) {
                    let replacement = update(current);
                    entry.value = Some(replacement);
                    return true;
                }
            }
            cursor = entry.next;
        }
        false
    }

    pub fn clear(&mut self) {
        self.entries.truncate(1);
        self.available.clear();
    }
}

/// Iterator over one node's tags.
#[derive(Debug, Clone)]
pub struct Tags<'a, T> {
    arena: &'a TagArena<T>,
    cursor: usize,
    remaining: usize,
}

impl<'a, T> Iterator for Tags<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let entry = self.arena.entries.get(self.cursor)?;
        self.cursor = entry.next;
        self.remaining -= 1;
        entry.value.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Tags<'_, T> {}
