//! Insertion, deletion/compaction and the read queries.

use crate::address::Address;
use crate::constants::*;
use crate::errors::Error;
use crate::helpers::KeyBits;
use crate::iter::{Iter, Walk};
use crate::types::{NodeArena, TagArena, Tree};
use log::{debug, info, trace};
use metrics::{counter, gauge};
use once_cell::sync::OnceCell;
use std::marker::PhantomData;

impl<A: Address, T> Default for Tree<A, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Address, T> Tree<A, T> {
    // ---- logging bootstraper -------------------------------------------------
    fn ensure_logging() {
        static INIT: OnceCell<()> = OnceCell::new();
        INIT.get_or_init(|| {
            // Host-installed loggers win; this only fills the gap.
            let _ = env_logger::builder()
                .format_module_path(false)
                .is_test(std::env::var("RUST_TEST_THREADS").is_ok())
                .try_init();
        });
    }

    /// Empty tree: just the root, which matches every address.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_NODE_CAPACITY, DEFAULT_TAG_CAPACITY)
    }

    /// Empty tree with room for `nodes` nodes and `tags` tags before the
    /// arenas reallocate.
    pub fn with_capacity(nodes: usize, tags: usize) -> Self {
        Self::ensure_logging();
        Self {
            nodes: NodeArena::with_capacity(nodes),
            tags: TagArena::with_capacity(tags),
            _address: PhantomData,
        }
    }

    /// Check the prefix length and return the canonical key.
    #[inline]
    fn validate(address: &A) -> Result<(A::Bits, u8), Error> {
        let length = address.prefix_len();
        let width = A::width();
        if length > width {
            return Err(Error::InvalidPrefix { length, width });
        }
        Ok((address.bits().canonical(length), length))
    }

    /// Index of the node standing for exactly `bits/length`, creating it (and
    /// a branch node, if the path has to fork) when absent.
    fn locate_or_create(&mut self, bits: A::Bits, length: u8) -> usize {
        let mut parent = SENTINEL;
        let mut current = ROOT_INDEX;
        loop {
            let node = self.nodes[current];
            let common = node
                .prefix
                .common_prefix_len(bits, node.prefix_len.min(length));
            #[cfg(feature = "trace")]
            trace!(
                "[LOCATE] node={} prefix={:x}/{} common={}",
                current,
                node.prefix,
                node.prefix_len,
                common
            );

            if common == node.prefix_len {
                // current's whole prefix is a prefix of the key
                if node.prefix_len == length {
                    return current;
                }
                let bit = bits.get_bit(node.prefix_len);
                let child = node.child(bit);
                if child == SENTINEL {
                    let leaf = self.nodes.allocate(bits, length);
                    self.nodes[current].set_child(bit, leaf);
                    trace!("[LOCATE] New leaf={} under node={}", leaf, current);
                    return leaf;
                }
                parent = current;
                current = child;
                continue;
            }

            // Divergence strictly inside current's prefix. Never the root,
            // whose zero-length prefix is always fully consumed.
            let branch = self.nodes.allocate(bits.canonical(common), common);
            self.nodes[branch].set_child(node.prefix.get_bit(common), current);
            self.nodes[parent].replace_child(current, branch);
            trace!(
                "[LOCATE] Split node={} at bit {} with branch={}",
                current,
                common,
                branch
            );
            if common == length {
                return branch;
            }
            let leaf = self.nodes.allocate(bits, length);
            self.nodes[branch].set_child(bits.get_bit(common), leaf);
            return leaf;
        }
    }

    /// Read-only exact search. Returns `(parent, node)`; the root's parent is
    /// `SENTINEL`.
    fn locate(&self, bits: A::Bits, length: u8) -> Option<(usize, usize)> {
        let mut parent = SENTINEL;
        let mut current = ROOT_INDEX;
        loop {
            let node = &self.nodes[current];
            let common = node
                .prefix
                .common_prefix_len(bits, node.prefix_len.min(length));
            if common < node.prefix_len {
                return None;
            }
            if node.prefix_len == length {
                return Some((parent, current));
            }
            let child = node.child(bits.get_bit(node.prefix_len));
            if child == SENTINEL {
                return None;
            }
            parent = current;
            current = child;
        }
    }

    /// Walk the match path for `bits/length`, calling `visit` on every fully
    /// matched node that carries tags, root first.
    fn descend<F>(&self, bits: A::Bits, length: u8, mut visit: F)
    where
        F: FnMut(usize),
    {
        let mut current = ROOT_INDEX;
        loop {
            let node = &self.nodes[current];
            let common = node
                .prefix
                .common_prefix_len(bits, node.prefix_len.min(length));
            #[cfg(feature = "trace")]
            trace!(
                "[FIND] node={} prefix={:x}/{} common={}",
                current,
                node.prefix,
                node.prefix_len,
                common
            );
            if common < node.prefix_len {
                return;
            }
            if node.tag_count > 0 {
                visit(current);
            }
            if node.prefix_len >= length {
                return;
            }
            let child = node.child(bits.get_bit(node.prefix_len));
            if child == SENTINEL {
                return;
            }
            current = child;
        }
    }

    /// Splice out `index` if it is tagless with fewer than two children.
    /// Only this node is examined; its parent is left as is.
    fn compact(&mut self, parent: usize, index: usize) {
        if index == ROOT_INDEX {
            return;
        }
        let node = self.nodes[index];
        debug_assert_eq!(node.tag_count, 0);
        let replacement = match (node.left, node.right) {
            (SENTINEL, SENTINEL) => SENTINEL,
            (child, SENTINEL) | (SENTINEL, child) => child,
            _ => return, // required branch point
        };
        self.nodes[parent].replace_child(index, replacement);
        self.nodes.free(index);
        counter!(METRIC_NODES_RECYCLED).increment(1);
        debug!(
            "[COMPACT] Removed node={} (parent={}, promoted={})",
            index, parent, replacement
        );
    }

    /// Append `tag` to the list at `address`.
    ///
    /// Returns whether the tag count grew (always, for `add`) and the node's new count.
    pub fn add(&mut self, address: A, tag: T) -> Result<(bool, usize), Error> {
        let (bits, length) = Self::validate(&address)?;
        counter!(METRIC_ADDS).increment(1);
        let index = self.locate_or_create(bits, length);
        let node = &mut self.nodes[index];
        self.tags.push(node, tag);
        debug!(
            "[ADD] address={:?} node={} count={}",
            address, index, node.tag_count
        );
        Ok((true, node.tag_count))
    }

    /// Like [`add`](Self::add), unless a tag already at `address` satisfies
    /// `matches(existing, &tag)`; that tag is then replaced in place by
    /// `update(existing)` and the count is unchanged.
    pub fn add_or_update<M, U>(
        &mut self,
        address: A,
        tag: T,
        matches: M,
        update: U,
    ) -> Result<(bool, usize), Error>
    where
        M: Fn(&T, &T) -> bool,
        U: FnOnce(&T) -> T,
    {
        let (bits, length) = Self::validate(&address)?;
        let index = self.locate_or_create(bits, length);
        let node = &mut self.nodes[index];
        if self
            .tags
            .update_first(node, |existing| matches(existing, &tag), update)
        {
            debug!("[ADD] address={:?} node={} updated in place", address, index);
            return Ok((false, node.tag_count));
        }
        counter!(METRIC_ADDS).increment(1);
        self.tags.push(node, tag);
        debug!(
            "[ADD] address={:?} node={} count={}",
            address, index, node.tag_count
        );
        Ok((true, node.tag_count))
    }

    /// Make `tag` the only tag at `address`.
    ///
    /// The flag is true only when the node had no tags before.
    pub fn set(&mut self, address: A, tag: T) -> Result<(bool, usize), Error> {
        let (bits, length) = Self::validate(&address)?;
        counter!(METRIC_SETS).increment(1);
        let index = self.locate_or_create(bits, length);
        let node = &mut self.nodes[index];
        let prior = node.tag_count;
        self.tags.clear_list(node);
        self.tags.push(node, tag);
        debug!(
            "[SET] address={:?} node={} replaced={}",
            address, index, prior
        );
        Ok((prior == 0, node.tag_count))
    }

    /// Like [`set`](Self::set), but when the node already has tags the new
    /// single value is `update(first existing tag)` and `tag` is dropped.
    pub fn set_or_update<U>(&mut self, address: A, tag: T, update: U) -> Result<(bool, usize), Error>
    where
        U: FnOnce(&T) -> T,
    {
        let (bits, length) = Self::validate(&address)?;
        counter!(METRIC_SETS).increment(1);
        let index = self.locate_or_create(bits, length);
        let node = &mut self.nodes[index];
        let prior = node.tag_count;
        let value = match self.tags.clear_list(node) {
            Some(existing) => update(&existing),
            None => tag,
        };
        self.tags.push(node, value);
        debug!(
            "[SET] address={:?} node={} replaced={}",
            address, index, prior
        );
        Ok((prior == 0, node.tag_count))
    }

    /// Remove every tag at exactly `address` for which
    /// `matches(tag, criterion)` holds, then compact the node if it emptied.
    ///
    /// A missing node is not an error; it deletes nothing.
    pub fn delete<C, F>(&mut self, address: A, matches: F, criterion: &C) -> Result<usize, Error>
    where
        C: ?Sized,
        F: Fn(&T, &C) -> bool,
    {
        let (bits, length) = Self::validate(&address)?;
        counter!(METRIC_DELETES).increment(1);
        let Some((parent, index)) = self.locate(bits, length) else {
            debug!("[DELETE] address={:?} has no node", address);
            return Ok(0);
        };
        let node = &mut self.nodes[index];
        let removed = self.tags.remove_where(node, |tag| matches(tag, criterion));
        let remaining = node.tag_count;
        debug!(
            "[DELETE] address={:?} node={} removed={} remaining={}",
            address, index, removed, remaining
        );
        if removed > 0 {
            counter!(METRIC_TAGS_DELETED).increment(removed as u64);
            if remaining == 0 {
                self.compact(parent, index);
            }
        }
        Ok(removed)
    }

    /// First tag (insertion order) of the longest matching prefix that has tags.
    pub fn find_deepest_tag(&self, address: A) -> Result<Option<&T>, Error> {
        let (bits, length) = Self::validate(&address)?;
        let mut best = None;
        self.descend(bits, length, |index| best = Some(index));
        Ok(best.and_then(|index| self.tags.value(self.nodes[index].first_tag)))
    }

    /// All tags of the longest matching prefix that has tags; empty if none.
    pub fn find_deepest_tags(&self, address: A) -> Result<Vec<&T>, Error> {
        let (bits, length) = Self::validate(&address)?;
        let mut best = None;
        self.descend(bits, length, |index| best = Some(index));
        Ok(match best {
            Some(index) => self.tags.iter(&self.nodes[index]).collect(),
            None => Vec::new(),
        })
    }

    /// Every tag on every matching prefix, least specific (root) first.
    pub fn find_tags(&self, address: A) -> Result<Vec<&T>, Error> {
        self.find_tags_with_filter(address, |_| true)
    }

    /// [`find_tags`](Self::find_tags), keeping only tags for which `filter` holds.
    pub fn find_tags_with_filter<F>(&self, address: A, mut filter: F) -> Result<Vec<&T>, Error>
    where
        F: FnMut(&T) -> bool,
    {
        let (bits, length) = Self::validate(&address)?;
        let mut found = Vec::new();
        self.descend(bits, length, |index| {
            for tag in self.tags.iter(&self.nodes[index]) {
                if filter(tag) {
                    found.push(tag);
                }
            }
        });
        Ok(found)
    }

    /// Nodes reachable from the root, root included.
    pub fn count_nodes(&self) -> usize {
        Walk::new(&self.nodes).count()
    }

    /// Tags on nodes reachable from the root.
    pub fn count_tags(&self) -> usize {
        Walk::new(&self.nodes)
            .map(|index| self.nodes[index].tag_count)
            .sum()
    }

    /// Tagged prefixes in pre-order (shorter before longer, 0-branch before 1-branch).
    pub fn iter(&self) -> Iter<'_, A, T> {
        Iter::new(self)
    }

    /// Drop everything but the (now untagged) root. Arena capacity is kept.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.tags.clear();
        info!("[CLEAR] Tree cleared.");
    }

    /// Node slots that can be handed out without reallocating.
    pub fn available_capacity(&self) -> usize {
        let nodes = &self.nodes.nodes;
        nodes.capacity() - nodes.len() + self.nodes.available.len()
    }

    /// Emit gauges periodically (caller decides cadence).
    pub fn report_capacity_metrics(&self) {
        gauge!(METRIC_FREE_SLOTS).set(self.available_capacity() as f64);
    }
}

impl<'a, A: Address, T> IntoIterator for &'a Tree<A, T> {
    type Item = (A, crate::arena::Tags<'a, T>);
    type IntoIter = Iter<'a, A, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
