//! Raw command pass-through
// (c) 2026 the xfer-engine developers

use tracing::info;

use crate::protocol::command::{CommandId, RawArgs};
use crate::protocol::reply::Reply;
use crate::session::{OpContext, Operation, unexpected_event};

/// Sends a command verbatim.
///
/// The effect of an arbitrary command is unknown, so everything cached for the server is
/// discarded and the working directory is forgotten.
#[derive(Debug)]
pub(crate) struct RawOp {
    args: RawArgs,
    sent: bool,
}

impl RawOp {
    pub(crate) fn new(args: RawArgs) -> Self {
        Self { args, sent: false }
    }
}

impl Operation for RawOp {
    fn id(&self) -> CommandId {
        CommandId::Raw
    }

    fn state_name(&self) -> &'static str {
        if self.sent { "waiting" } else { "raw" }
    }

    fn send(&mut self, ctx: &mut OpContext<'_>) -> Reply {
        if self.sent {
            return unexpected_event(self, "send");
        }
        info!("Sending raw command '{}'", self.args.command());
        if let Some(server) = ctx.server() {
            ctx.cache.invalidate_server(server);
        }
        ctx.state.current_path = None;
        self.sent = true;
        ctx.transport.send_command(self.args.command())
    }

    fn parse_response(&mut self, ctx: &mut OpContext<'_>) -> Reply {
        if !self.sent {
            return unexpected_event(self, "response");
        }
        ctx.transport.result()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod test {
    use crate::cache::{DirectoryCache, DirectoryListing, MemoryDirectoryCache};
    use crate::protocol::command::{Command, RawArgs};
    use crate::protocol::path::ServerPath;
    use crate::protocol::reply::Reply;
    use crate::session::test::{RecordingTransport, connected_executor, run_to_end, test_server};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn verbatim_and_invalidates() {
        let cache = Arc::new(MemoryDirectoryCache::new());
        cache.store(
            &test_server(),
            DirectoryListing::new(ServerPath::new("/a"), vec![]),
        );
        let mut exec = connected_executor(RecordingTransport::default(), cache.clone());
        exec.transport_mut().script([Reply::OK]);
        let reply = exec.execute(Command::Raw(RawArgs::new("ln -s \"x y\" z")));
        assert_eq!(run_to_end(&mut exec, reply), Reply::OK);
        assert_eq!(exec.transport().sent, ["ln -s \"x y\" z"]);
        assert!(cache.is_empty());
        assert!(exec.current_path().is_none());
    }
}
