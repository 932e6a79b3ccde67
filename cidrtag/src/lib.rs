//! String-facing wrapper: tag CIDR ranges of either family, query IPs.
//!
//! ```
//! use cidrtag::CidrTagger;
//!
//! let mut tagger = CidrTagger::new();
//! tagger.add("10.0.0.0/8", "private").unwrap();
//! tagger.add("2001:db8::/32", "documentation").unwrap();
//!
//! assert_eq!(tagger.lookup("10.20.30.40").unwrap(), Some(&"private"));
//! assert_eq!(tagger.lookup("2001:db8::1").unwrap(), Some(&"documentation"));
//! assert_eq!(tagger.lookup("192.0.2.1").unwrap(), None);
//! ```

use cidrtag_core::{parse_ip_from_string, ParsedAddress, TreeV4, TreeV6};
use log::debug;

pub use cidrtag_core::{AddressError, Error};

/// Parse failures arrive as [`Error::Address`] with the parser's own detail.
pub type TaggerResult<T> = Result<T, Error>;

/// One IPv4 tree and one IPv6 tree behind a single string API.
#[derive(Debug, Clone)]
pub struct CidrTagger<T> {
    v4: TreeV4<T>,
    v6: TreeV6<T>,
}

impl<T> Default for CidrTagger<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CidrTagger<T> {
    pub fn new() -> Self {
        Self {
            v4: TreeV4::new(),
            v6: TreeV6::new(),
        }
    }

    /// Append `tag` to the range (`1.2.3.0/24`, `2001:db8::/32`, a bare IP, ...).
    /// Returns the range's tag count afterwards.
    pub fn add(&mut self, cidr: &str, tag: T) -> TaggerResult<usize> {
        let (_, count) = match parse_ip_from_string(cidr)? {
            ParsedAddress::V4(a) => self.v4.add(a, tag)?,
            ParsedAddress::V6(a) => self.v6.add(a, tag)?,
        };
        debug!("[TAGGER] add {} -> {} tags", cidr, count);
        Ok(count)
    }

    /// Replace whatever the range carried with `tag`. True if it was untagged.
    pub fn set(&mut self, cidr: &str, tag: T) -> TaggerResult<bool> {
        let (fresh, _) = match parse_ip_from_string(cidr)? {
            ParsedAddress::V4(a) => self.v4.set(a, tag)?,
            ParsedAddress::V6(a) => self.v6.set(a, tag)?,
        };
        debug!("[TAGGER] set {} (fresh={})", cidr, fresh);
        Ok(fresh)
    }

    /// Remove the tags stored on exactly `cidr` that satisfy `matches(tag, criterion)`.
    pub fn delete<C, F>(&mut self, cidr: &str, matches: F, criterion: &C) -> TaggerResult<usize>
    where
        C: ?Sized,
        F: Fn(&T, &C) -> bool,
    {
        let removed = match parse_ip_from_string(cidr)? {
            ParsedAddress::V4(a) => self.v4.delete(a, matches, criterion)?,
            ParsedAddress::V6(a) => self.v6.delete(a, matches, criterion)?,
        };
        debug!("[TAGGER] delete {} removed {}", cidr, removed);
        Ok(removed)
    }

    /// Remove every tag stored on exactly `cidr`.
    pub fn remove(&mut self, cidr: &str) -> TaggerResult<usize> {
        self.delete(cidr, |_, _| true, &())
    }

    /// First tag of the most specific range covering `ip`.
    pub fn lookup(&self, ip: &str) -> TaggerResult<Option<&T>> {
        Ok(match parse_ip_from_string(ip)? {
            ParsedAddress::V4(a) => self.v4.find_deepest_tag(a)?,
            ParsedAddress::V6(a) => self.v6.find_deepest_tag(a)?,
        })
    }

    /// Every tag of every range covering `ip`, broadest range first.
    pub fn tags(&self, ip: &str) -> TaggerResult<Vec<&T>> {
        self.tags_with_filter(ip, |_| true)
    }

    pub fn tags_with_filter<F>(&self, ip: &str, filter: F) -> TaggerResult<Vec<&T>>
    where
        F: FnMut(&T) -> bool,
    {
        Ok(match parse_ip_from_string(ip)? {
            ParsedAddress::V4(a) => self.v4.find_tags_with_filter(a, filter)?,
            ParsedAddress::V6(a) => self.v6.find_tags_with_filter(a, filter)?,
        })
    }

    /// Tags stored across both families.
    pub fn len(&self) -> usize {
        self.v4.count_tags() + self.v6.count_tags()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.v4.clear();
        self.v6.clear();
    }

    pub fn v4(&self) -> &TreeV4<T> {
        &self.v4
    }

    pub fn v6(&self) -> &TreeV6<T> {
        &self.v6
    }
}
