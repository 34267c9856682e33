//! Remove directory
// (c) 2026 the xfer-engine developers

use tracing::{debug, info};

use super::change_dir;
use crate::cache::Freshness;
use crate::protocol::command::{CommandId, RemoveDirArgs};
use crate::protocol::reply::Reply;
use crate::session::{OpContext, Operation, unexpected_event};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
enum State {
    Init,
    WaitCwd,
    Rmdir,
    Waiting,
}

/// Removes a directory, relative to its parent where possible
#[derive(Debug)]
pub(crate) struct RemoveDirOp {
    args: RemoveDirArgs,
    state: State,
    use_absolute: bool,
}

impl RemoveDirOp {
    pub(crate) fn new(args: RemoveDirArgs) -> Self {
        Self {
            args,
            state: State::Init,
            use_absolute: false,
        }
    }
}

impl Operation for RemoveDirOp {
    fn id(&self) -> CommandId {
        CommandId::RemoveDir
    }

    fn state_name(&self) -> &'static str {
        self.state.into()
    }

    fn send(&mut self, ctx: &mut OpContext<'_>) -> Reply {
        match self.state {
            State::Init => {
                info!(
                    "Removing directory '{}'",
                    self.args.path().format_filename(self.args.sub_dir(), false)
                );
                self.state = State::WaitCwd;
                change_dir(ctx, self.args.path());
                Reply::CONTINUE
            }
            State::Rmdir => {
                if let Some(server) = ctx.server() {
                    ctx.cache
                        .remove_dir(server, self.args.path(), self.args.sub_dir());
                }
                let name = self
                    .args
                    .path()
                    .format_filename(self.args.sub_dir(), !self.use_absolute);
                let quoted = ctx.transport.quote_filename(&name);
                self.state = State::Waiting;
                ctx.transport.send_command(&format!("rmdir {quoted}"))
            }
            State::WaitCwd | State::Waiting => unexpected_event(self, "send"),
        }
    }

    fn parse_response(&mut self, ctx: &mut OpContext<'_>) -> Reply {
        match self.state {
            State::Waiting => ctx.transport.result(),
            State::Init | State::WaitCwd | State::Rmdir => unexpected_event(self, "response"),
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
            debug!("could not change directory ({prev}), using absolute path");
            self.use_absolute = true;
        }
        self.state = State::Rmdir;
        Reply::CONTINUE
    }

    fn cancel(&mut self, ctx: &mut OpContext<'_>) {
        if self.state != State::Waiting {
            return;
        }
        if let Some(server) = ctx.server() {
            let _ = ctx.cache.update_file(
                server,
                self.args.path(),
                self.args.sub_dir(),
                true,
                Freshness::Unsure,
            );
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod test {
    use crate::cache::{DirEntry, DirectoryCache, DirectoryListing, MemoryDirectoryCache};
    use crate::protocol::command::{Command, RemoveDirArgs};
    use crate::protocol::path::ServerPath;
    use crate::protocol::reply::Reply;
    use crate::session::test::{RecordingTransport, connected_executor, run_to_end, test_server};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn removes_and_forgets() {
        let cache = Arc::new(MemoryDirectoryCache::new());
        cache.store(
            &test_server(),
            DirectoryListing::new(ServerPath::new("/data"), vec![DirEntry::dir("old")]),
        );
        cache.store(
            &test_server(),
            DirectoryListing::new(ServerPath::new("/data/old"), vec![]),
        );
        let mut exec = connected_executor(RecordingTransport::default(), cache.clone());
        exec.transport_mut().script([Reply::OK, Reply::OK]);
        let reply = exec.execute(Command::RemoveDir(RemoveDirArgs::new(
            ServerPath::new("/data"),
            "old",
        )));
        assert_eq!(run_to_end(&mut exec, reply), Reply::OK);
        assert_eq!(exec.transport().sent, ["cd \"/data\"", "rmdir old"]);
        assert!(cache.lookup(&test_server(), &ServerPath::new("/data/old")).is_none());
        let parent = cache.lookup(&test_server(), &ServerPath::new("/data")).unwrap();
        assert!(parent.entry("old").is_none());
    }

    #[test]
    fn absolute_fallback() {
        let mut exec = connected_executor(
            RecordingTransport::default(),
            Arc::new(MemoryDirectoryCache::new()),
        );
        exec.transport_mut().script([Reply::ERROR, Reply::ERROR]);
        let reply = exec.execute(Command::RemoveDir(RemoveDirArgs::new(
            ServerPath::new("/data"),
            "old",
        )));
        assert_eq!(run_to_end(&mut exec, reply), Reply::ERROR);
        assert_eq!(exec.transport().sent[1], "rmdir \"/data/old\"");
    }
}
