//! Directory listings as held by the cache
// (c) 2026 the xfer-engine developers

use std::time::{Duration, Instant};

use crate::protocol::path::ServerPath;

/// How far a cached directory entry can be trusted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Freshness {
    /// The entry reflects the server as of the listing
    Known,
    /// The entry is stale; its details must be fetched again
    #[default]
    Unknown,
    /// A mutation may or may not have taken effect
    Unsure,
}

/// One entry in a directory listing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name
    pub name: String,
    /// Is this a directory?
    pub is_dir: bool,
    /// Size in bytes, if known
    pub size: Option<u64>,
    /// How far the entry can be trusted
    pub freshness: Freshness,
}

impl DirEntry {
    /// A file entry, straight from the server
    #[must_use]
    pub fn file(name: &str, size: u64) -> Self {
        Self {
            name: name.to_string(),
            is_dir: false,
            size: Some(size),
            freshness: Freshness::Known,
        }
    }

    /// A directory entry, straight from the server
    #[must_use]
    pub fn dir(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_dir: true,
            size: None,
            freshness: Freshness::Known,
        }
    }
}

/// The cached contents of one remote directory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryListing {
    /// Which directory
    pub path: ServerPath,
    /// Contents, in server order
    pub entries: Vec<DirEntry>,
    /// When the listing was received
    pub fetched: Instant,
}

impl DirectoryListing {
    /// Constructor; the listing is timestamped now
    #[must_use]
    pub fn new(path: ServerPath, entries: Vec<DirEntry>) -> Self {
        Self {
            path,
            entries,
            fetched: Instant::now(),
        }
    }

    /// Does any entry need refetching?
    #[must_use]
    pub fn has_unsure_entries(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.freshness != Freshness::Known)
    }

    /// How long ago the listing was received
    #[must_use]
    pub fn age(&self) -> Duration {
        self.fetched.elapsed()
    }

    /// Finds an entry by name
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&DirEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod test {
    use super::{DirEntry, DirectoryListing, Freshness};
    use crate::protocol::path::ServerPath;
    use pretty_assertions::assert_eq;

    #[test]
    fn unsure_detection() {
        let mut l = DirectoryListing::new(
            ServerPath::new("/d"),
            vec![DirEntry::file("a", 1), DirEntry::dir("b")],
        );
        assert!(!l.has_unsure_entries());
        l.entries[1].freshness = Freshness::Unsure;
        assert!(l.has_unsure_entries());
        assert_eq!(l.entry("b").map(|e| e.is_dir), Some(true));
        assert!(l.entry("c").is_none());
    }

    #[test]
    fn freshness_names() {
        assert_eq!(Freshness::Unknown.to_string(), "unknown");
        assert_eq!(Freshness::default(), Freshness::Unknown);
    }
}
