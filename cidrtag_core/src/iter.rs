//! Depth-first traversal over the node arena.

use crate::address::Address;
use crate::arena::Tags;
use crate::constants::{ROOT_INDEX, SENTINEL};
use crate::types::{NodeArena, Tree};

/// Pre-order walk of node indices reachable from the root.
pub(crate) struct Walk<'a, B> {
    nodes: &'a NodeArena<B>,
    stack: Vec<usize>,
}

impl<'a, B> Walk<'a, B> {
    pub(crate) fn new(nodes: &'a NodeArena<B>) -> Self {
        let mut stack = Vec::with_capacity(64);
        stack.push(ROOT_INDEX);
        Self { nodes, stack }
    }
}

impl<B> Iterator for Walk<'_, B> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let index = self.stack.pop()?;
        let node = &self.nodes[index];
        // right first so the 0-branch comes out first
        if node.right != SENTINEL {
            self.stack.push(node.right);
        }
        if node.left != SENTINEL {
            self.stack.push(node.left);
        }
        Some(index)
    }
}

/// Tagged prefixes of a [`Tree`] with their tags.
pub struct Iter<'a, A: Address, T> {
    tree: &'a Tree<A, T>,
    walk: Walk<'a, A::Bits>,
}

impl<'a, A: Address, T> Iter<'a, A, T> {
    pub(crate) fn new(tree: &'a Tree<A, T>) -> Self {
        Self {
            tree,
            walk: Walk::new(&tree.nodes),
        }
    }
}

impl<'a, A: Address, T> Iterator for Iter<'a, A, T> {
    type Item = (A, Tags<'a, T>);

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        for index in self.walk.by_ref() {
            let node = &tree.nodes[index];
            if node.tag_count > 0 {
                let address = A::from_parts(node.prefix, node.prefix_len);
                return Some((address, tree.tags.iter(node)));
            }
        }
        None
    }
}
