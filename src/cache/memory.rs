//! In-memory directory cache
// (c) 2026 the xfer-engine developers

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::trace;

use super::{DirEntry, DirectoryCache, DirectoryListing, Freshness};
use crate::protocol::path::ServerPath;
use crate::protocol::server::Server;

type Key = (Server, ServerPath);

/// A [`DirectoryCache`] held in a hash map
#[derive(Debug, Default)]
pub struct MemoryDirectoryCache {
    listings: Mutex<HashMap<Key, DirectoryListing>>,
}

impl MemoryDirectoryCache {
    /// Constructor
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Key, DirectoryListing>> {
        // The map is consistent between calls, so a panic elsewhere does not invalidate it
        self.listings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The number of directories currently cached
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Is the cache empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

fn key(server: &Server, path: &ServerPath) -> Key {
    (server.clone(), path.clone())
}

impl DirectoryCache for MemoryDirectoryCache {
    fn store(&self, server: &Server, listing: DirectoryListing) {
        trace!("caching {} entries for {}", listing.entries.len(), listing.path);
        let _ = self.lock().insert(key(server, &listing.path), listing);
    }

    fn lookup(&self, server: &Server, path: &ServerPath) -> Option<DirectoryListing> {
        self.lock().get(&key(server, path)).cloned()
    }

    fn update_file(
        &self,
        server: &Server,
        path: &ServerPath,
        file: &str,
        is_dir: bool,
        freshness: Freshness,
    ) -> bool {
        let mut map = self.lock();
        let Some(listing) = map.get_mut(&key(server, path)) else {
            return false;
        };
        if let Some(entry) = listing.entries.iter_mut().find(|e| e.name == file) {
            entry.is_dir = is_dir;
            entry.freshness = freshness;
        } else {
            listing.entries.push(DirEntry {
                name: file.to_string(),
                is_dir,
                size: None,
                freshness,
            });
        }
        true
    }

    fn remove_file(&self, server: &Server, path: &ServerPath, file: &str) {
        if let Some(listing) = self.lock().get_mut(&key(server, path)) {
            listing.entries.retain(|e| e.name != file);
        }
    }

    fn invalidate_dir(&self, server: &Server, path: &ServerPath) {
        let _ = self.lock().remove(&key(server, path));
    }

    fn remove_dir(&self, server: &Server, path: &ServerPath, sub_dir: &str) {
        let target = path.join(sub_dir);
        let mut map = self.lock();
        if let Some(listing) = map.get_mut(&key(server, path)) {
            listing.entries.retain(|e| e.name != sub_dir);
        }
        map.retain(|(s, p), _| s != server || !target.is_parent_of_or_same(p));
    }

    fn rename(
        &self,
        server: &Server,
        from_path: &ServerPath,
        from_file: &str,
        to_path: &ServerPath,
        to_file: &str,
    ) {
        let mut map = self.lock();
        let mut moved = None;
        if let Some(listing) = map.get_mut(&key(server, from_path)) {
            if let Some(idx) = listing.entries.iter().position(|e| e.name == from_file) {
                moved = Some(listing.entries.remove(idx));
            }
        }
        if let Some(listing) = map.get_mut(&key(server, to_path)) {
            listing.entries.retain(|e| e.name != to_file);
            let is_dir = moved.as_ref().is_some_and(|e| e.is_dir);
            listing.entries.push(DirEntry {
                name: to_file.to_string(),
                is_dir,
                size: moved.and_then(|e| e.size),
                freshness: Freshness::Unknown,
            });
        }
        // Listings of a renamed directory no longer describe anything
        let old = from_path.join(from_file);
        map.retain(|(s, p), _| s != server || !old.is_parent_of_or_same(p));
    }

    fn invalidate_server(&self, server: &Server) {
        self.lock().retain(|(s, _), _| s != server);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod test {
    use super::MemoryDirectoryCache;
    use crate::cache::{DirEntry, DirectoryCache, DirectoryListing, Freshness};
    use crate::protocol::path::ServerPath;
    use crate::protocol::server::{Protocol, Server};
    use pretty_assertions::assert_eq;

    fn server() -> Server {
        Server::new(Protocol::Sftp, "host", "user")
    }

    fn populated() -> MemoryDirectoryCache {
        let c = MemoryDirectoryCache::new();
        c.store(
            &server(),
            DirectoryListing::new(
                ServerPath::new("/home/user"),
                vec![DirEntry::file("a.txt", 10), DirEntry::dir("sub")],
            ),
        );
        c.store(
            &server(),
            DirectoryListing::new(ServerPath::new("/home/user/sub"), vec![DirEntry::file("x", 1)]),
        );
        c
    }

    #[test]
    fn update_existing_and_new() {
        let c = populated();
        let home = ServerPath::new("/home/user");
        assert!(c.update_file(&server(), &home, "a.txt", false, Freshness::Unknown));
        assert!(c.update_file(&server(), &home, "new", true, Freshness::Unknown));
        let l = c.lookup(&server(), &home).unwrap();
        assert_eq!(l.entry("a.txt").unwrap().freshness, Freshness::Unknown);
        assert_eq!(l.entry("a.txt").unwrap().size, Some(10));
        assert!(l.entry("new").unwrap().is_dir);
        assert!(l.has_unsure_entries());
    }

    #[test]
    fn update_uncached_directory() {
        let c = populated();
        assert!(!c.update_file(
            &server(),
            &ServerPath::new("/elsewhere"),
            "f",
            false,
            Freshness::Unknown
        ));
    }

    #[test]
    fn servers_are_separate() {
        let c = populated();
        let other = Server::new(Protocol::Sftp, "host2", "user");
        assert!(c.lookup(&other, &ServerPath::new("/home/user")).is_none());
        c.invalidate_server(&other);
        assert_eq!(c.len(), 2);
        c.invalidate_server(&server());
        assert!(c.is_empty());
    }

    #[test]
    fn remove_file() {
        let c = populated();
        let home = ServerPath::new("/home/user");
        c.remove_file(&server(), &home, "a.txt");
        assert!(c.lookup(&server(), &home).unwrap().entry("a.txt").is_none());
    }

    #[test]
    fn remove_dir_drops_subtree() {
        let c = populated();
        let home = ServerPath::new("/home/user");
        c.remove_dir(&server(), &home, "sub");
        assert!(c.lookup(&server(), &home).unwrap().entry("sub").is_none());
        assert!(
            c.lookup(&server(), &ServerPath::new("/home/user/sub"))
                .is_none()
        );
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn rename_within_directory() {
        let c = populated();
        let home = ServerPath::new("/home/user");
        c.rename(&server(), &home, "sub", &home, "renamed");
        let l = c.lookup(&server(), &home).unwrap();
        assert!(l.entry("sub").is_none());
        let e = l.entry("renamed").unwrap();
        assert!(e.is_dir);
        assert_eq!(e.freshness, Freshness::Unknown);
        assert!(
            c.lookup(&server(), &ServerPath::new("/home/user/sub"))
                .is_none()
        );
    }

    #[test]
    fn invalidate_dir() {
        let c = populated();
        c.invalidate_dir(&server(), &ServerPath::new("/home/user/sub"));
        assert_eq!(c.len(), 1);
    }
}
