//! Rename
// (c) 2026 the xfer-engine developers

use tracing::{debug, info};

use super::change_dir;
use crate::protocol::command::{CommandId, RenameArgs};
use crate::protocol::reply::Reply;
use crate::session::{OpContext, Operation, unexpected_event};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
enum State {
    Init,
    WaitCwd,
    Rename,
    Waiting,
}

/// Renames a file or directory, possibly into another directory.
///
/// The source is named relative to the working directory when the change into its directory
/// succeeded. The target is relative only if it stays in the same directory.
#[derive(Debug)]
pub(crate) struct RenameOp {
    args: RenameArgs,
    state: State,
    use_absolute: bool,
}

impl RenameOp {
    pub(crate) fn new(args: RenameArgs) -> Self {
        Self {
            args,
            state: State::Init,
            use_absolute: false,
        }
    }
}

impl Operation for RenameOp {
    fn id(&self) -> CommandId {
        CommandId::Rename
    }

    fn state_name(&self) -> &'static str {
        self.state.into()
    }

    fn send(&mut self, ctx: &mut OpContext<'_>) -> Reply {
        let a = &self.args;
        match self.state {
            State::Init => {
                info!(
                    "Renaming '{}' to '{}'",
                    a.from_path().format_filename(a.from_file(), false),
                    a.to_path().format_filename(a.to_file(), false)
                );
                self.state = State::WaitCwd;
                change_dir(ctx, a.from_path());
                Reply::CONTINUE
            }
            State::Rename => {
                if let Some(server) = ctx.server() {
                    ctx.cache.rename(
                        server,
                        a.from_path(),
                        a.from_file(),
                        a.to_path(),
                        a.to_file(),
                    );
                }
                let relative = !self.use_absolute;
                let from = a.from_path().format_filename(a.from_file(), relative);
                let to = a
                    .to_path()
                    .format_filename(a.to_file(), relative && a.to_path() == a.from_path());
                let command = format!(
                    "mv {} {}",
                    ctx.transport.quote_filename(&from),
                    ctx.transport.quote_filename(&to)
                );
                self.state = State::Waiting;
                ctx.transport.send_command(&command)
            }
            State::WaitCwd | State::Waiting => unexpected_event(self, "send"),
        }
    }

    fn parse_response(&mut self, ctx: &mut OpContext<'_>) -> Reply {
        match self.state {
            State::Waiting => ctx.transport.result(),
            State::Init | State::WaitCwd | State::Rename => unexpected_event(self, "response"),
        }
    }

    fn subcommand_result(
        &mut self,
        prev: Reply,
        _prev_op: &dyn Operation,
        _ctx: &mut OpContext<'_>,
    ) -> Reply {
        if self.state != State::WaitCwd {
            return unexpected_event(self, "subcommand result");
        }
        if prev != Reply::OK {
            debug!("could not change directory ({prev}), using absolute paths");
            self.use_absolute = true;
        }
        self.state = State::Rename;
        Reply::CONTINUE
    }

    fn cancel(&mut self, ctx: &mut OpContext<'_>) {
        if self.state != State::Waiting {
            return;
        }
        // Either name may or may not exist now
        if let Some(server) = ctx.server() {
            ctx.cache.invalidate_dir(server, self.args.from_path());
            ctx.cache.invalidate_dir(server, self.args.to_path());
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod test {
    use crate::cache::{DirEntry, DirectoryCache, DirectoryListing, Freshness, MemoryDirectoryCache};
    use crate::protocol::command::{Command, RenameArgs};
    use crate::protocol::path::ServerPath;
    use crate::protocol::reply::Reply;
    use crate::session::test::{RecordingTransport, connected_executor, run_to_end, test_server};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::sync::Arc;

    #[rstest]
    #[case("/a", "/a", Reply::OK, "mv x y")]
    #[case("/a", "/b", Reply::OK, "mv x \"/b/y\"")]
    #[case("/a", "/a", Reply::ERROR, "mv \"/a/x\" \"/a/y\"")]
    fn wire_command(
        #[case] from: &str,
        #[case] to: &str,
        #[case] cwd: Reply,
        #[case] expected: &str,
    ) {
        let mut exec = connected_executor(
            RecordingTransport::default(),
            Arc::new(MemoryDirectoryCache::new()),
        );
        exec.transport_mut().script([cwd, Reply::OK]);
        let reply = exec.execute(Command::Rename(RenameArgs::new(
            ServerPath::new(from),
            "x",
            ServerPath::new(to),
            "y",
        )));
        assert_eq!(run_to_end(&mut exec, reply), Reply::OK);
        assert_eq!(exec.transport().sent[1], expected);
    }

    #[test]
    fn cache_follows_rename() {
        let cache = Arc::new(MemoryDirectoryCache::new());
        cache.store(
            &test_server(),
            DirectoryListing::new(ServerPath::new("/a"), vec![DirEntry::file("x", 5)]),
        );
        let mut exec = connected_executor(RecordingTransport::default(), cache.clone());
        let reply = exec.execute(Command::Rename(RenameArgs::new(
            ServerPath::new("/a"),
            "x",
            ServerPath::new("/a"),
            "y",
        )));
        assert_eq!(reply, Reply::WOULDBLOCK);
        exec.transport_mut().complete();
        // mv is now in flight
        assert_eq!(exec.response_received(), Reply::WOULDBLOCK);
        let listing = cache.lookup(&test_server(), &ServerPath::new("/a")).unwrap();
        assert!(listing.entry("x").is_none());
        assert_eq!(listing.entry("y").unwrap().freshness, Freshness::Unknown);

        assert_eq!(exec.cancel(), Reply::CANCELED);
        assert!(cache.lookup(&test_server(), &ServerPath::new("/a")).is_none());
    }
}
