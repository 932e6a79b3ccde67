//! Shared constants for the prefix trie

/// Index 0 of either arena is never a live record; it doubles as "no link".
pub const SENTINEL: usize = 0;
/// The root node lives at index 1 for the lifetime of the tree.
pub const ROOT_INDEX: usize = 1;

pub const V4_WIDTH: u8 = 32;
pub const V6_WIDTH: u8 = 128;

// Default arena reservations used by `Tree::new`
pub const DEFAULT_NODE_CAPACITY: usize = 16;
pub const DEFAULT_TAG_CAPACITY: usize = 16;

// Metric names
pub const METRIC_ADDS: &str = "cidrtag_adds_total";
pub const METRIC_SETS: &str = "cidrtag_sets_total";
pub const METRIC_DELETES: &str = "cidrtag_deletes_total";
pub const METRIC_TAGS_DELETED: &str = "cidrtag_tags_deleted_total";
pub const METRIC_NODES_RECYCLED: &str = "cidrtag_nodes_recycled_total";
pub const METRIC_FREE_SLOTS: &str = "cidrtag_free_node_slots";
