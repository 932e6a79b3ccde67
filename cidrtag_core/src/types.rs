//! Data structures for the prefix trie

use crate::address::Address;
use std::marker::PhantomData;

/// One trie vertex. Links are arena indices; `SENTINEL` means absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Node<B> {
    pub prefix: B,          // canonical: bits past prefix_len are zero
    pub prefix_len: u8,     // significant bits in prefix
    pub left: usize,        // child whose next bit is 0
    pub right: usize,       // child whose next bit is 1
    pub tag_count: usize,   // live entries in this node's tag list
    pub first_tag: usize,   // head of the tag list
    pub last_tag: usize,    // tail of the tag list, for O(1) append
}

/// A payload in a node's singly linked tag list.
#[derive(Debug, Clone)]
pub struct TagEntry<T> {
    pub value: Option<T>, // None only for the sentinel and freed slots
    pub next: usize,
}

/// Growable pool of nodes with a LIFO stack of recycled indices.
#[derive(Debug, Clone)]
pub struct NodeArena<B> {
    pub(crate) nodes: Vec<Node<B>>,
    pub(crate) available: Vec<usize>,
}

/// Backing store for every node's tag list; freed slots are recycled the
/// same way node indices are.
#[derive(Debug, Clone)]
pub struct TagArena<T> {
    pub(crate) entries: Vec<TagEntry<T>>,
    pub(crate) available: Vec<usize>,
}

/// Path-compressed binary trie mapping prefixes to ordered tag lists.
///
/// Single-threaded: mutating calls take `&mut self`, so sharing across threads
/// needs an outer lock (e.g. `RwLock<Tree<_, _>>`).
#[derive(Debug, Clone)]
pub struct Tree<A: Address, T> {
    pub(crate) nodes: NodeArena<A::Bits>,
    pub(crate) tags: TagArena<T>,
    pub(crate) _address: PhantomData<fn() -> A>,
}
