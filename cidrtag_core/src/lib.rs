//! Prefix trie that hangs ordered lists of tags off IPv4/IPv6 prefixes.
//!
//! ```
//! use cidrtag_core::{IPv4Address, TreeV4};
//!
//! let mut tree = TreeV4::new();
//! tree.add(IPv4Address::default(), "default").unwrap();
//! tree.add("10.0.0.0/8".parse().unwrap(), "private").unwrap();
//!
//! let ip: IPv4Address = "10.1.2.3".parse().unwrap();
//! assert_eq!(tree.find_deepest_tag(ip).unwrap(), Some(&"private"));
//! assert_eq!(tree.find_tags(ip).unwrap(), [&"default", &"private"]);
//! ```

pub mod address;
pub mod arena;
pub mod constants;
pub mod errors;
pub mod helpers;
pub mod iter;
pub mod telemetry;
pub mod tree;
pub mod types;

pub use address::{parse_ip_from_string, Address, AddressError, IPv4Address, IPv6Address, ParsedAddress};
pub use arena::Tags;
pub use errors::Error;
pub use iter::Iter;
pub use types::Tree;

/// Tree over 32-bit IPv4 prefixes.
pub type TreeV4<T> = Tree<IPv4Address, T>;

/// Tree over 128-bit IPv6 prefixes.
pub type TreeV6<T> = Tree<IPv6Address, T>;
