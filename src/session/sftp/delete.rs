//! Delete files
// (c) 2026 the xfer-engine developers

use tracing::{debug, info, warn};

use super::change_dir;
use crate::cache::Freshness;
use crate::protocol::command::{CommandId, DeleteArgs};
use crate::protocol::path::ServerPath;
use crate::protocol::reply::Reply;
use crate::session::{OpContext, Operation, unexpected_event};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
enum State {
    Init,
    WaitCwd,
    Delete,
}

/// Deletes files from one directory, one `rm` each.
///
/// A file which cannot be deleted does not stop the others; the operation reports
/// [`Reply::ERROR`] at the end if any failed. Critical errors and timeouts end it at once.
#[derive(Debug)]
pub(crate) struct DeleteOp {
    path: ServerPath,
    files: Vec<String>,
    state: State,
    use_absolute: bool,
    next: usize,
    in_flight: bool,
    failed: usize,
}

impl DeleteOp {
    pub(crate) fn new(args: DeleteArgs) -> Self {
        let (path, files) = args.into_parts();
        Self {
            path,
            files,
            state: State::Init,
            use_absolute: false,
            next: 0,
            in_flight: false,
            failed: 0,
        }
    }
}

impl Operation for DeleteOp {
    fn id(&self) -> CommandId {
        CommandId::Delete
    }

    fn state_name(&self) -> &'static str {
        self.state.into()
    }

    fn send(&mut self, ctx: &mut OpContext<'_>) -> Reply {
        match self.state {
            State::Init => {
                info!("Deleting {} file(s) from '{}'", self.files.len(), self.path);
                self.state = State::WaitCwd;
                change_dir(ctx, &self.path);
                Reply::CONTINUE
            }
            State::Delete if self.in_flight => unexpected_event(self, "send"),
            State::Delete => {
                let Some(file) = self.files.get(self.next) else {
                    return if self.failed == 0 {
                        Reply::OK
                    } else {
                        warn!("{} of {} file(s) could not be deleted", self.failed, self.files.len());
                        Reply::ERROR
                    };
                };
                if let Some(server) = ctx.server() {
                    ctx.cache.remove_file(server, &self.path, file);
                }
                let name = self.path.format_filename(file, !self.use_absolute);
                let quoted = ctx.transport.quote_filename(&name);
                self.in_flight = true;
                ctx.transport.send_command(&format!("rm {quoted}"))
            }
            State::WaitCwd => unexpected_event(self, "send"),
        }
    }

    fn parse_response(&mut self, ctx: &mut OpContext<'_>) -> Reply {
        if self.state != State::Delete || !self.in_flight {
            return unexpected_event(self, "response");
        }
        self.in_flight = false;
        let result = ctx.transport.result();
        if result.is_error() {
            if result.is_critical() || result.contains(Reply::TIMEOUT) {
                return result;
            }
            let file = self.files.get(self.next).map_or("", String::as_str);
            debug!("could not delete '{file}': {result}");
            self.failed += 1;
        }
        self.next += 1;
        Reply::CONTINUE
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
        self.use_absolute = prev != Reply::OK;
        self.state = State::Delete;
        Reply::CONTINUE
    }

    fn cancel(&mut self, ctx: &mut OpContext<'_>) {
        if !self.in_flight {
            return;
        }
        if let (Some(server), Some(file)) = (ctx.server(), self.files.get(self.next)) {
            let _ = ctx
                .cache
                .update_file(server, &self.path, file, false, Freshness::Unsure);
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod test {
    use crate::cache::{DirEntry, DirectoryCache, DirectoryListing, MemoryDirectoryCache};
    use crate::protocol::command::{Command, DeleteArgs};
    use crate::protocol::path::ServerPath;
    use crate::protocol::reply::Reply;
    use crate::session::test::{RecordingTransport, connected_executor, run_to_end, test_server};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn delete(files: &[&str]) -> Command {
        Command::Delete(DeleteArgs::new(
            ServerPath::new("/data"),
            files.iter().map(ToString::to_string).collect(),
        ))
    }

    #[test]
    fn deletes_each_file() {
        let cache = Arc::new(MemoryDirectoryCache::new());
        cache.store(
            &test_server(),
            DirectoryListing::new(
                ServerPath::new("/data"),
                vec![DirEntry::file("a", 1), DirEntry::file("b c", 2), DirEntry::file("keep", 3)],
            ),
        );
        let mut exec = connected_executor(RecordingTransport::default(), cache.clone());
        exec.transport_mut().script([Reply::OK, Reply::OK, Reply::OK]);
        let reply = exec.execute(delete(&["a", "b c"]));
        assert_eq!(run_to_end(&mut exec, reply), Reply::OK);
        assert_eq!(
            exec.transport().sent,
            ["cd \"/data\"", "rm a", "rm \"b c\""]
        );
        let listing = cache.lookup(&test_server(), &ServerPath::new("/data")).unwrap();
        let names: Vec<_> = listing.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["keep"]);
    }

    #[test]
    fn partial_failure() {
        let mut exec = connected_executor(
            RecordingTransport::default(),
            Arc::new(MemoryDirectoryCache::new()),
        );
        exec.transport_mut()
            .script([Reply::ERROR, Reply::ERROR, Reply::OK]);
        let reply = exec.execute(delete(&["a", "b"]));
        assert_eq!(run_to_end(&mut exec, reply), Reply::ERROR);
        assert_eq!(
            exec.transport().sent,
            ["cd \"/data\"", "rm \"/data/a\"", "rm \"/data/b\""]
        );
    }

    #[test]
    fn timeout_stops() {
        let mut exec = connected_executor(
            RecordingTransport::default(),
            Arc::new(MemoryDirectoryCache::new()),
        );
        exec.transport_mut().script([Reply::OK, Reply::TIMEOUT]);
        let reply = exec.execute(delete(&["a", "b"]));
        assert_eq!(run_to_end(&mut exec, reply), Reply::TIMEOUT);
        assert_eq!(exec.transport().sent.len(), 2);
    }
}
