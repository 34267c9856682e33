//! Directory listing
// (c) 2026 the xfer-engine developers

use tracing::{debug, info};

use super::change_dir;
use crate::cache::{DirectoryListing, Freshness};
use crate::protocol::command::{CommandId, ListArgs};
use crate::protocol::flags::ListFlags;
use crate::protocol::path::ServerPath;
use crate::protocol::reply::Reply;
use crate::session::{OpContext, Operation, unexpected_event};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
enum State {
    Init,
    WaitCwd,
    List,
    Waiting,
}

/// Retrieves a directory listing, from the cache if it is good enough.
///
/// In symlink discovery mode ([`ListFlags::LINK`]) the target is a link; failing to change
/// into it means it does not point to a directory, reported as [`Reply::LINKNOTDIR`].
#[derive(Debug)]
pub(crate) struct ListOp {
    args: ListArgs,
    state: State,
    /// The directory being listed, if we know it
    target: Option<ServerPath>,
}

impl ListOp {
    pub(crate) fn new(args: ListArgs) -> Self {
        Self {
            args,
            state: State::Init,
            target: None,
        }
    }

    /// Can the cached listing of the target stand in for a fresh one?
    fn cached_is_sufficient(&self, ctx: &OpContext<'_>) -> bool {
        let flags = self.args.flags();
        if flags.intersects(ListFlags::REFRESH | ListFlags::LINK) {
            return false;
        }
        let (Some(server), Some(target)) = (ctx.server(), self.target.as_ref()) else {
            return false;
        };
        let Some(listing) = ctx.cache.lookup(server, target) else {
            return false;
        };
        if listing.has_unsure_entries() {
            return false;
        }
        flags.contains(ListFlags::AVOID) || listing.age() < ctx.config.cache_ttl_duration()
    }
}

impl Operation for ListOp {
    fn id(&self) -> CommandId {
        CommandId::List
    }

    fn state_name(&self) -> &'static str {
        self.state.into()
    }

    fn send(&mut self, ctx: &mut OpContext<'_>) -> Reply {
        match self.state {
            State::Init => {
                let path = self.args.path();
                let needs_cwd = !path.is_empty();
                self.target = if needs_cwd {
                    Some(path.join(self.args.sub_dir()))
                } else {
                    ctx.state.current_path.clone()
                };

                if self.args.flags().contains(ListFlags::CLEARCACHE)
                    && let (Some(server), Some(target)) = (ctx.server(), self.target.as_ref())
                {
                    ctx.cache.invalidate_dir(server, target);
                }
                if self.cached_is_sufficient(ctx) {
                    debug!("cached listing is sufficient");
                    return Reply::OK;
                }

                match self.target.as_ref() {
                    Some(target) if needs_cwd && ctx.state.current_path.as_ref() != Some(target) => {
                        self.state = State::WaitCwd;
                        change_dir(ctx, target);
                    }
                    _ => self.state = State::List,
                }
                Reply::CONTINUE
            }
            State::List => {
                match self.target.as_ref() {
                    Some(target) => info!("Retrieving directory listing of '{target}'"),
                    None => info!("Retrieving directory listing"),
                }
                self.state = State::Waiting;
                ctx.transport.send_command("ls")
            }
            State::WaitCwd | State::Waiting => unexpected_event(self, "send"),
        }
    }

    fn parse_response(&mut self, ctx: &mut OpContext<'_>) -> Reply {
        if self.state != State::Waiting {
            return unexpected_event(self, "response");
        }
        let result = ctx.transport.result();
        if result.is_error() {
            return result;
        }
        let entries = ctx.transport.take_listing();
        if let (Some(server), Some(target), Some(mut entries)) =
            (ctx.server(), self.target.as_ref(), entries)
        {
            for e in &mut entries {
                e.freshness = Freshness::Known;
            }
            ctx.cache
                .store(server, DirectoryListing::new(target.clone(), entries));
        }
        result
    }

    fn subcommand_result(
        &mut self,
        prev: Reply,
        _prev_op: &dyn Operation,
        ctx: &mut OpContext<'_>,
    ) -> Reply {
        if self.state != State::WaitCwd {
            return unexpected_event(self, "subcommand result");
        }
        if prev != Reply::OK {
            let flags = self.args.flags();
            if flags.contains(ListFlags::LINK) && !prev.is_critical() {
                debug!("link is not a directory");
                return Reply::LINKNOTDIR;
            }
            if !flags.contains(ListFlags::FALLBACK_CURRENT) {
                return prev;
            }
            debug!("could not change directory ({prev}), listing the current one");
            self.target = ctx.state.current_path.clone();
        }
        self.state = State::List;
        Reply::CONTINUE
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod test {
    use crate::cache::{DirEntry, DirectoryCache, DirectoryListing, Freshness, MemoryDirectoryCache};
    use crate::protocol::command::{Command, ListArgs};
    use crate::protocol::flags::ListFlags;
    use crate::protocol::path::ServerPath;
    use crate::protocol::reply::Reply;
    use crate::session::test::{RecordingTransport, connected_executor, run_to_end, test_server};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::sync::Arc;

    fn list(path: &str, sub: &str, flags: ListFlags) -> Command {
        Command::List(ListArgs::new(ServerPath::new(path), sub, flags))
    }

    fn listing_transport() -> RecordingTransport {
        RecordingTransport {
            listing: Some(vec![DirEntry::file("f", 1), DirEntry::dir("d")]),
            ..Default::default()
        }
    }

    #[test]
    fn fetches_and_stores() {
        let cache = Arc::new(MemoryDirectoryCache::new());
        let mut exec = connected_executor(listing_transport(), cache.clone());
        exec.transport_mut().script([Reply::OK, Reply::OK]);
        let reply = exec.execute(list("/pub", "", ListFlags::NONE));
        assert_eq!(run_to_end(&mut exec, reply), Reply::OK);
        assert_eq!(exec.transport().sent, ["cd \"/pub\"", "ls"]);

        let stored = cache.lookup(&test_server(), &ServerPath::new("/pub")).unwrap();
        assert_eq!(stored.entries.len(), 2);
        assert!(!stored.has_unsure_entries());
    }

    #[rstest]
    #[case(ListFlags::NONE, false, false)]
    #[case(ListFlags::REFRESH, false, true)]
    #[case(ListFlags::NONE, true, true)]
    #[case(ListFlags::AVOID, false, false)]
    #[case(ListFlags::CLEARCACHE, false, true)]
    fn cache_use(#[case] flags: ListFlags, #[case] unsure: bool, #[case] fetched: bool) {
        let cache = Arc::new(MemoryDirectoryCache::new());
        let mut entry = DirEntry::file("f", 1);
        if unsure {
            entry.freshness = Freshness::Unsure;
        }
        cache.store(
            &test_server(),
            DirectoryListing::new(ServerPath::new("/pub"), vec![entry]),
        );
        let mut exec = connected_executor(listing_transport(), cache.clone());
        exec.transport_mut().script([Reply::OK, Reply::OK]);
        let reply = exec.execute(list("/pub", "", flags));
        assert_eq!(run_to_end(&mut exec, reply), Reply::OK);
        assert_eq!(exec.transport().sent.contains(&"ls".to_string()), fetched);
    }

    #[test]
    fn expired_listing_is_refetched() {
        let cache = Arc::new(MemoryDirectoryCache::new());
        cache.store(
            &test_server(),
            DirectoryListing::new(ServerPath::new("/pub"), vec![]),
        );
        let mut exec = connected_executor(listing_transport(), cache.clone());
        exec.config_mut().cache_ttl = 0;
        exec.transport_mut().script([Reply::OK, Reply::OK]);
        let reply = exec.execute(list("/pub", "", ListFlags::NONE));
        assert_eq!(run_to_end(&mut exec, reply), Reply::OK);
        assert_eq!(exec.transport().sent, ["cd \"/pub\"", "ls"]);
    }

    #[test]
    fn current_directory_skips_cwd() {
        let mut exec = connected_executor(
            listing_transport(),
            Arc::new(MemoryDirectoryCache::new()),
        );
        exec.transport_mut().script([Reply::OK]);
        let reply = exec.execute(Command::List(ListArgs::default()));
        assert_eq!(run_to_end(&mut exec, reply), Reply::OK);
        assert_eq!(exec.transport().sent, ["ls"]);
    }

    #[test]
    fn link_not_dir() {
        let mut exec = connected_executor(
            listing_transport(),
            Arc::new(MemoryDirectoryCache::new()),
        );
        exec.transport_mut().script([Reply::ERROR]);
        let reply = exec.execute(list("/pub", "link", ListFlags::LINK));
        assert_eq!(run_to_end(&mut exec, reply), Reply::LINKNOTDIR);
        assert_eq!(exec.transport().sent, ["cd \"/pub/link\""]);
    }

    #[rstest]
    #[case(ListFlags::NONE, Reply::ERROR, 1)]
    #[case(ListFlags::FALLBACK_CURRENT, Reply::OK, 2)]
    fn cwd_failure(#[case] flags: ListFlags, #[case] expected: Reply, #[case] sent: usize) {
        let cache = Arc::new(MemoryDirectoryCache::new());
        let mut exec = connected_executor(listing_transport(), cache.clone());
        exec.transport_mut().script([Reply::ERROR, Reply::OK]);
        let reply = exec.execute(list("/gone", "", flags));
        assert_eq!(run_to_end(&mut exec, reply), expected);
        assert_eq!(exec.transport().sent.len(), sent);
        // Where the fallback listing came from is unknown, so it is not cached
        assert!(cache.is_empty());
    }
}
