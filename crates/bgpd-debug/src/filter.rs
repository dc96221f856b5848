//! Debug filter lists.
//!
//! A filter list narrows a debug flag to specific neighbors or prefixes. An
//! entry owns either a neighbor handle or a prefix, never both; dropping the
//! entry releases what it holds.

use std::fmt;
use std::sync::Arc;

use bgpd_types::IpPrefix;

use crate::neighbor::{Neighbor, NeighborRef};

/// One entry of a [`FilterList`].
#[derive(Debug, Clone)]
pub enum FilterEntry {
    Neighbor(NeighborRef),
    Prefix(IpPrefix),
}

impl FilterEntry {
    /// Creates a neighbor entry, taking a new reference to the neighbor.
    pub fn neighbor(neighbor: &NeighborRef) -> Self {
        FilterEntry::Neighbor(Arc::clone(neighbor))
    }

    pub fn prefix(prefix: IpPrefix) -> Self {
        FilterEntry::Prefix(prefix)
    }

    /// Returns the key this entry is looked up by.
    pub fn key(&self) -> FilterKey<'_> {
        match self {
            FilterEntry::Neighbor(n) => FilterKey::Neighbor(n),
            FilterEntry::Prefix(p) => FilterKey::Prefix(p),
        }
    }

    /// Neighbors match by identity; prefixes match when they name the same
    /// network at the same length.
    pub fn matches(&self, key: FilterKey<'_>) -> bool {
        match (self, key) {
            (FilterEntry::Neighbor(n), FilterKey::Neighbor(q)) => std::ptr::eq(Arc::as_ptr(n), q),
            (FilterEntry::Prefix(p), FilterKey::Prefix(q)) => p.matches_exact(q),
            _ => false,
        }
    }
}

impl fmt::Display for FilterEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterEntry::Neighbor(n) => f.write_str(n.host()),
            FilterEntry::Prefix(p) => p.fmt(f),
        }
    }
}

/// Borrowed lookup key for [`FilterList`] queries.
#[derive(Debug, Clone, Copy)]
pub enum FilterKey<'a> {
    Neighbor(&'a Neighbor),
    Prefix(&'a IpPrefix),
}

/// Ordered collection of filter entries. Order is insertion order and only
/// matters for display.
#[derive(Debug, Default)]
pub struct FilterList {
    entries: Vec<FilterEntry>,
}

impl FilterList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry unless an equivalent one is already present.
    ///
    /// Returns false (and drops `entry`) on a duplicate.
    pub fn add(&mut self, entry: FilterEntry) -> bool {
        if self.contains(entry.key()) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Removes the first entry matching `key`. Returns whether one was found.
    pub fn remove(&mut self, key: FilterKey<'_>) -> bool {
        match self.entries.iter().position(|e| e.matches(key)) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, key: FilterKey<'_>) -> bool {
        self.entries.iter().any(|e| e.matches(key))
    }

    /// Removes and releases every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterEntry> {
        self.entries.iter()
    }

    /// Renders the entries space separated, in insertion order.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FilterList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            entry.fmt(f)?;
        }
        Ok(())
    }
}
