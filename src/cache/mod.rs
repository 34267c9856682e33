//! Directory cache bridge
//!
//! Operations which mutate remote state tell the cache what they have done _before_ they
//! send the wire command, so a concurrent reader sees the entry as stale rather than
//! trusting an out of date listing. The storage behind the trait is up to the implementer;
//! [`MemoryDirectoryCache`] is a simple in-memory one.
// (c) 2026 the xfer-engine developers

mod listing;
mod memory;

pub use listing::{DirEntry, DirectoryListing, Freshness};
pub use memory::MemoryDirectoryCache;

use crate::protocol::path::ServerPath;
use crate::protocol::server::Server;

/// Cached directory metadata, keyed by (server, directory path, entry name)
#[cfg_attr(test, mockall::automock)]
pub trait DirectoryCache: Send + Sync {
    /// Stores a listing received from the server, replacing any previous listing of that directory
    fn store(&self, server: &Server, listing: DirectoryListing);

    /// Retrieves a copy of the cached listing of a directory
    fn lookup(&self, server: &Server, path: &ServerPath) -> Option<DirectoryListing>;

    /// Records a change to one entry of a directory.
    ///
    /// If the directory has a cached listing, the entry is created or updated with the given
    /// freshness and `true` is returned. Otherwise there is nothing to update and `false` is returned.
    fn update_file(
        &self,
        server: &Server,
        path: &ServerPath,
        file: &str,
        is_dir: bool,
        freshness: Freshness,
    ) -> bool;

    /// Removes one entry from a directory's listing
    fn remove_file(&self, server: &Server, path: &ServerPath, file: &str);

    /// Discards the cached listing of a directory
    fn invalidate_dir(&self, server: &Server, path: &ServerPath);

    /// Forgets a subdirectory: its entry in `path`, and every listing at or below it
    fn remove_dir(&self, server: &Server, path: &ServerPath, sub_dir: &str);

    /// Moves an entry between (or within) directories
    fn rename(
        &self,
        server: &Server,
        from_path: &ServerPath,
        from_file: &str,
        to_path: &ServerPath,
        to_file: &str,
    );

    /// Discards everything known about a server
    fn invalidate_server(&self, server: &Server);
}
